//! End-to-end compliance run.
//!
//! connect → handshake → get-config → evaluate → close, strictly in order.
//! Fatal errors abort before evaluation and leave no partial result; a
//! failed close is reported as a warning and the result is kept.

use crate::compliance::{check_rules, ComplianceResult, BUILTIN_RULES};
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Datastore, Session, SessionTimeouts};
use crate::report::{report_outcomes, Reporter};
use crate::transport::{SshTransport, Transport};

/// Connect to the configured device and audit the configured datastore.
pub async fn run_check(config: &Config, reporter: &dyn Reporter) -> Result<ComplianceResult> {
    let params = config.connection.parameters()?;

    reporter.info(&format!("Connecting to NETCONF router at {}", params.address));
    let transport = SshTransport::connect(&params).await?;
    reporter.info("SSH connection established");

    run_with_transport(
        transport,
        config.session.timeouts(),
        config.session.datastore,
        reporter,
    )
    .await
}

/// Run the session part of a check over an already open transport.
///
/// Audits the configuration held in `source`. The transport is released on
/// every path, including handshake failure.
pub async fn run_with_transport<T: Transport>(
    transport: T,
    timeouts: SessionTimeouts,
    source: Datastore,
    reporter: &dyn Reporter,
) -> Result<ComplianceResult> {
    let mut session = Session::new(transport, timeouts);

    let configuration = match fetch_config(&mut session, source, reporter).await {
        Ok(configuration) => configuration,
        Err(e) => {
            session.abort().await;
            return Err(e);
        },
    };
    reporter.info("Configuration retrieved successfully");

    reporter.info("Validating compliance rules...");
    let outcomes = check_rules(BUILTIN_RULES, &configuration);
    report_outcomes(reporter, &outcomes);
    let result = ComplianceResult::from_outcomes(&outcomes);

    match session.close().await {
        Ok(()) => reporter.info("NETCONF session closed"),
        Err(warning) => reporter.warn(&format!("Failed to close session gracefully: {warning}")),
    }

    Ok(result)
}

async fn fetch_config<T: Transport>(
    session: &mut Session<T>,
    source: Datastore,
    reporter: &dyn Reporter,
) -> Result<String> {
    session.handshake().await?;
    match session.session_id() {
        Some(id) => reporter.info(&format!("NETCONF session {id} initiated")),
        None => reporter.info("NETCONF session initiated"),
    }

    reporter.info(&format!("Retrieving {source} configuration..."));
    session.get_config(source).await
}
