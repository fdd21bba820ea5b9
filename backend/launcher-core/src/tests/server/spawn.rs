// Unit tests for spawn module private helpers

use crate::server::ServerExit;
use crate::server::spawn::{announced_address, get_url_regex};

/// **VALUE**: Tests that the announcement regex extracts host and port from Streamlit output.
///
/// **WHY THIS MATTERS**: The launcher warns when Streamlit listens on a different port than
/// requested (it silently picks another one if the port is taken). That warning relies on
/// this match.
///
/// **BUG THIS CATCHES**: Would catch a broken pattern or renamed capture groups.
#[test]
fn given_streamlit_local_url_line_when_parsed_then_extracts_host_and_port() {
    // GIVEN: Streamlit's startup banner line
    let line = "  Local URL: http://localhost:8501";

    // WHEN: Parsing the announcement
    let address = announced_address(line);

    // THEN: Host and port are extracted
    assert_eq!(address, Some((String::from("localhost"), 8501)));
}

/// **VALUE**: Tests that network URLs with IP addresses parse too.
#[test]
fn given_network_url_line_when_parsed_then_extracts_ip_and_port() {
    let address = announced_address("  Network URL: http://192.168.1.20:8502");

    assert_eq!(address, Some((String::from("192.168.1.20"), 8502)));
}

/// **VALUE**: Tests that ordinary log lines do not count as announcements.
///
/// **BUG THIS CATCHES**: Would catch an over-eager pattern producing bogus port warnings.
#[test]
fn given_non_url_lines_when_parsed_then_returns_none() {
    // GIVEN: Lines without a host:port URL
    let cases = [
        "You can now view your Streamlit app in your browser.",
        "http://localhost",
        "localhost:8501",
        "ftp://localhost:21",
        "http://localhost:99999",
    ];

    // WHEN / THEN: None of them parse
    for line in cases {
        assert_eq!(announced_address(line), None, "Should not parse: {line}");
    }
}

/// **VALUE**: Tests that the regex accepts https as well.
#[test]
fn given_https_url_when_regex_applied_then_matches() {
    let caps = get_url_regex().captures("https://localhost:8443/app");

    assert!(caps.is_some());
    assert_eq!(caps.unwrap().name("port").unwrap().as_str(), "8443");
}

/// **VALUE**: Tests the exit descriptions written to the log.
#[test]
fn given_server_exits_when_displayed_then_describe_code_or_signal() {
    assert_eq!(ServerExit { code: Some(0) }.to_string(), "exit code 0");
    assert_eq!(ServerExit { code: Some(1) }.to_string(), "exit code 1");
    assert_eq!(ServerExit { code: None }.to_string(), "terminated by signal");
    assert!(ServerExit { code: Some(0) }.success());
    assert!(!ServerExit { code: None }.success());
}
