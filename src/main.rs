use ankifill::{
    anki::AnkiClient,
    core::{
        logging,
        pipeline::run_batch,
    },
    enrichment::EnrichmentClient,
    AnkifillError,
    Config,
};
use tracing::info;

fn main() {
    if let Err(err) = run() {
        tracing::error!(error = %err, "run aborted");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AnkifillError> {
    let log_path = logging::init()?;

    // Validate configuration before touching the network.
    let config = Config::from_env()?;

    println!(
        "ankifill | deck: {} | note type: {} | log: {}",
        config.deck_name,
        config.note_type,
        log_path.display()
    );
    info!(
        deck = %config.deck_name,
        note_type = %config.note_type,
        model = %config.model,
        "run started"
    );

    let store = AnkiClient::new(&config.anki_connect_url)?;
    let enricher = EnrichmentClient::new(&config)?;

    let tally = run_batch(&store, &enricher, &config.deck_name);

    println!(
        "Done: {} updated / {} skipped / {} failed / {} total.",
        tally.success, tally.skipped, tally.failed, tally.total
    );
    info!(
        success = tally.success,
        skipped = tally.skipped,
        failed = tally.failed,
        total = tally.total,
        "run finished"
    );

    // Per-note failures are reported above but never fail the process.
    Ok(())
}
