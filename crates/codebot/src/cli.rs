use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "codestudio")]
#[command(author, version, about = "Telegram bot and mini app backend that turns task descriptions into code", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the web server and the bot (webhook mode by default)
    Run {
        /// Use long polling instead of registering a webhook
        #[arg(long)]
        polling: bool,
    },

    /// Generate code for a task once and print it to stdout
    Generate {
        /// Task description, e.g. "build a calculator"
        task: String,

        /// Skip the enhancement stage and send the task straight to generation
        #[arg(long)]
        no_enhance: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults_to_webhook() {
        let cli = Cli::try_parse_from(["codestudio", "run"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Run { polling: false }));
    }

    #[test]
    fn test_generate_flags() {
        let cli = Cli::try_parse_from(["codestudio", "generate", "build a calculator", "--no-enhance"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Generate {
                task: "build a calculator".to_string(),
                no_enhance: true,
            })
        );
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["codestudio"]).unwrap();
        assert!(cli.command.is_none());
    }
}
