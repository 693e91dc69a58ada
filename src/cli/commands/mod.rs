pub mod auth;
pub mod logging;
pub mod view;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("formgate")
        .about("Login and signup forms for an external auth API")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("FORMGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = auth::with_args(command);
    let command = view::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cleared_env<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        temp_env::with_vars(
            [
                ("FORMGATE_PORT", None::<&str>),
                ("FORMGATE_AUTH_URL", None::<&str>),
                ("FORMGATE_AUTH_TIMEOUT_SECONDS", None::<&str>),
                ("FORMGATE_REDIRECT_DELAY_MS", None::<&str>),
                ("FORMGATE_UNAUTHENTICATED_RESPONSE", None::<&str>),
                ("FORMGATE_CORS_ORIGINS", None::<&str>),
                ("FORMGATE_LOG_LEVEL", None::<&str>),
            ],
            f,
        )
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "formgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Login and signup forms for an external auth API".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec!["formgate"]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>(auth::ARG_AUTH_URL).cloned(),
                Some("http://localhost:8000".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<u64>(view::ARG_REDIRECT_DELAY_MS)
                    .copied(),
                Some(4000)
            );
            assert_eq!(
                matches
                    .get_one::<String>(view::ARG_UNAUTHENTICATED_RESPONSE)
                    .cloned(),
                Some("page".to_string())
            );
            let origins: Vec<String> = matches
                .get_many::<String>(view::ARG_CORS_ORIGIN)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            assert_eq!(origins.len(), 3);
        });
    }

    #[test]
    fn test_check_args() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec![
                "formgate",
                "--port",
                "9090",
                "--auth-url",
                "https://auth.example.com",
                "--redirect-delay-ms",
                "250",
                "--unauthenticated-response",
                "json",
                "--cors-origin",
                "https://app.example.com",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
            assert_eq!(
                matches.get_one::<String>(auth::ARG_AUTH_URL).cloned(),
                Some("https://auth.example.com".to_string())
            );
            assert_eq!(
                matches
                    .get_one::<u64>(view::ARG_REDIRECT_DELAY_MS)
                    .copied(),
                Some(250)
            );
            assert_eq!(
                matches
                    .get_one::<String>(view::ARG_UNAUTHENTICATED_RESPONSE)
                    .cloned(),
                Some("json".to_string())
            );
            let origins: Vec<String> = matches
                .get_many::<String>(view::ARG_CORS_ORIGIN)
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            assert_eq!(origins, vec!["https://app.example.com".to_string()]);
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("FORMGATE_PORT", Some("443")),
                ("FORMGATE_AUTH_URL", Some("https://auth.example.com")),
                ("FORMGATE_AUTH_TIMEOUT_SECONDS", Some("3")),
                ("FORMGATE_UNAUTHENTICATED_RESPONSE", Some("json")),
                (
                    "FORMGATE_CORS_ORIGINS",
                    Some("https://a.example.com,https://b.example.com"),
                ),
                ("FORMGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["formgate"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(auth::ARG_AUTH_URL).cloned(),
                    Some("https://auth.example.com".to_string())
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(auth::ARG_AUTH_TIMEOUT_SECONDS)
                        .copied(),
                    Some(3)
                );
                let origins: Vec<String> = matches
                    .get_many::<String>(view::ARG_CORS_ORIGIN)
                    .map(|values| values.cloned().collect())
                    .unwrap_or_default();
                assert_eq!(
                    origins,
                    vec![
                        "https://a.example.com".to_string(),
                        "https://b.example.com".to_string()
                    ]
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("FORMGATE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["formgate"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("FORMGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["formgate".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_invalid_unauthenticated_response() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec![
                "formgate",
                "--unauthenticated-response",
                "redirect",
            ]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::InvalidValue)
            );
        });
    }
}
