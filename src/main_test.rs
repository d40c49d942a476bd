use super::*;

fn network() -> RequestError {
    RequestError::Network { message: "network unreachable".into() }
}

#[test]
fn notified_request_failures_are_not_printed_again() {
    assert!(CliError::Request(network()).already_reported());
    assert!(CliError::Auth(AuthError::Request(network())).already_reported());
}

#[test]
fn local_failures_are_printed() {
    assert!(!CliError::InvalidQuery("page".into()).already_reported());
    assert!(!CliError::Auth(AuthError::MalformedResponse("missing token".into())).already_reported());
    assert!(!CliError::Router(RouterError::NotFound("/nope".into())).already_reported());
}

#[test]
fn api_subcommand_parses_query_pairs() {
    let cli = Cli::try_parse_from(["authgate", "api", "get", "/api/orders", "-q", "page=2", "--query", "size=10"]).unwrap();
    match cli.command {
        Command::Api(args) => {
            assert_eq!(args.method, "get");
            assert_eq!(args.query, vec!["page=2".to_owned(), "size=10".to_owned()]);
        }
        other => panic!("unexpected: {other:?}"),
    }
}
