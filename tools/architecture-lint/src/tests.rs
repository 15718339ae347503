//! Unit tests for the architecture lint.

use std::path::PathBuf;

use rstest::rstest;

use super::*;

fn lint_one(file: &str, contents: &str) -> Result<(), ArchitectureLintError> {
    lint_sources(&[LintSource {
        file: PathBuf::from(file),
        contents: contents.to_owned(),
    }])
}

fn segments(path: &str) -> Vec<String> {
    path.split("::").map(str::to_owned).collect()
}

#[rstest]
#[case::domain_uses_ports(
    "domain/session.rs",
    "use super::ports::TokenStore; use crate::domain::ApiError; fn f() {}",
    true
)]
#[case::domain_uses_tracing("domain/session.rs", "use tracing::warn; fn f() {}", true)]
#[case::domain_reaches_outbound(
    "domain/session.rs",
    "use crate::outbound::token_store::FileTokenStore; fn f() {}",
    false
)]
#[case::domain_reaches_inbound_via_super(
    "domain/api/trips.rs",
    "fn f() { super::super::inbound::cli::run(); }",
    false
)]
#[case::domain_uses_reqwest("domain/api_client.rs", "use reqwest::Client; fn f() {}", false)]
#[case::domain_uses_clap("domain/search.rs", "use clap::Args; fn f() {}", false)]
#[case::domain_reads_config(
    "domain/session.rs",
    "fn f() { let _ = ortho_config::OrthoConfig::load; }",
    false
)]
#[case::domain_extern_crate("domain/mod.rs", "extern crate cap_std; fn f() {}", false)]
#[case::inbound_uses_domain(
    "inbound/cli/mod.rs",
    "use crate::domain::{ApiError, SessionManager}; use clap::Parser; fn f() {}",
    true
)]
#[case::inbound_reaches_outbound(
    "inbound/cli/commands.rs",
    "use travel_client::outbound::http::ReqwestTransport; fn f() {}",
    false
)]
#[case::inbound_uses_cap_std("inbound/cli/mod.rs", "use cap_std::fs::Dir; fn f() {}", false)]
#[case::outbound_uses_reqwest(
    "outbound/http/reqwest_transport.rs",
    "use reqwest::Client; use crate::domain::ports::ApiTransport; fn f() {}",
    true
)]
#[case::outbound_reaches_inbound(
    "outbound/token_store/file.rs",
    "use inbound::cli::Cli; fn f() {}",
    false
)]
#[case::outbound_uses_clap("outbound/http/mod.rs", "fn f() { let _ = clap::Command::new(\"x\"); }", false)]
fn detects_boundary_violations(#[case] file: &str, #[case] contents: &str, #[case] ok: bool) {
    let result = lint_one(file, contents);
    assert_eq!(result.is_ok(), ok, "result: {result:?}");
}

#[rstest]
fn files_outside_layers_are_rejected() {
    let err = lint_one("main.rs", "fn main() {}").expect_err("main.rs has no layer");
    assert!(matches!(err, ArchitectureLintError::Parse { .. }), "{err}");
}

#[rstest]
fn unparsable_sources_are_rejected() {
    let err = lint_one("domain/broken.rs", "fn {").expect_err("invalid Rust");
    assert!(matches!(err, ArchitectureLintError::Parse { .. }), "{err}");
}

#[rstest]
fn repeated_imports_report_once() {
    let err = lint_one(
        "domain/session.rs",
        "use reqwest::Client; fn f() { let _ = reqwest::Client::new(); }",
    )
    .expect_err("reqwest is forbidden");
    let ArchitectureLintError::Violations(violations) = err else {
        panic!("expected violations");
    };
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].message,
        "domain module must not depend on external crate `reqwest`"
    );
}

#[rstest]
#[case("crate::domain::ApiError", Some(Target::Module("domain")))]
#[case("super::super::outbound", Some(Target::Module("outbound")))]
#[case("travel_client::inbound::cli", Some(Target::Module("inbound")))]
#[case("outbound::http", Some(Target::Module("outbound")))]
#[case("serde_json::Value", Some(Target::Crate("serde_json")))]
#[case("self", None)]
fn classifies_path_roots(#[case] path: &str, #[case] expected: Option<Target<'static>>) {
    let segments = segments(path);
    assert_eq!(classify(&segments), expected);
}
