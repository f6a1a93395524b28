#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command, EnvArg};
    use clap::Parser;
    use kiln_config::Environment;
    use std::path::PathBuf;

    #[test]
    fn build_defaults_to_development() {
        let cli = Cli::try_parse_from(["kiln", "build"]).unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.env, EnvArg::Development);
                assert!(args.out_dir.is_none());
                assert!(!args.clean);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn build_with_env_and_out_dir() {
        let cli =
            Cli::try_parse_from(["kiln", "build", "--env", "production", "--out-dir", "public"])
                .unwrap();
        match cli.command {
            Command::Build(args) => {
                assert_eq!(Environment::from(args.env), Environment::Production);
                assert_eq!(args.out_dir, Some(PathBuf::from("public")));
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn env_aliases_are_accepted() {
        let cli = Cli::try_parse_from(["kiln", "check", "-e", "prod"]).unwrap();
        match cli.command {
            Command::Check(args) => assert_eq!(args.env, EnvArg::Production),
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn unknown_env_is_rejected() {
        assert!(Cli::try_parse_from(["kiln", "build", "--env", "staging"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["kiln", "build", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(!cli.quiet);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["kiln", "-v", "-q", "build"]).is_err());
    }
}
