use std::io::BufRead;

use lead_form::configuration::get_configuration;
use lead_form::controller::FormController;
use lead_form::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("lead_form".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration");
    let controller = FormController::new(configuration.submission.client());

    // Minimal driver standing in for a UI layer: `<field>=<value>` edits the
    // draft, `state` prints a snapshot, `submit` posts the lead.
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "submit" {
            let status = controller.submit().await;
            println!("{status}");
        } else if input == "state" {
            let snapshot = controller.current_state();
            println!(
                "{} <{}> [{}] - {}",
                snapshot.record.name,
                snapshot.record.email,
                snapshot.record.lead_type,
                snapshot.status
            );
        } else if let Some((field, value)) = input.split_once('=') {
            controller.update_field(field.trim(), value);
        } else {
            eprintln!("expected `<field>=<value>`, `state` or `submit`");
        }
    }

    Ok(())
}
