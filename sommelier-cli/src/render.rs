use sommelier_core::controller::ResultOrigin;
use sommelier_model::{ScanState, WineResult};
use tokio::sync::watch;

/// Print every published snapshot until the controller goes away.
pub async fn print_snapshots(mut snapshots: watch::Receiver<ScanState>) {
    print_snapshot(&snapshots.borrow_and_update());
    while snapshots.changed().await.is_ok() {
        print_snapshot(&snapshots.borrow_and_update());
    }
}

fn print_snapshot(state: &ScanState) {
    let mut flags = Vec::new();
    if state.is_processing() {
        flags.push("processing");
    }
    if state.network_error() {
        flags.push("offline");
    }
    if state.show_offline_options() {
        flags.push("cached results available");
    }

    let flags = if flags.is_empty() {
        String::new()
    } else {
        format!(" ({})", flags.join(", "))
    };
    println!("[{:>10}] {}{}", state.stage().as_str(), state.message(), flags);
}

pub fn print_results(wines: &[WineResult], origin: ResultOrigin) {
    let label = match origin {
        ResultOrigin::Live => "Matched wines",
        ResultOrigin::Offline => "Cached wines",
    };
    println!();
    println!("{label}:");
    print_wines(wines);
}

pub fn print_wines(wines: &[WineResult]) {
    for wine in wines {
        let mut line = format!("  {}", wine.name);
        if let Some(vintage) = wine.vintage {
            line.push_str(&format!(" {vintage}"));
        }
        if let Some(producer) = &wine.producer {
            line.push_str(&format!(", {producer}"));
        }
        if let Some(region) = &wine.region {
            line.push_str(&format!(" ({region})"));
        }
        if let Some(price) = &wine.list_price {
            line.push_str(&format!("  {price}"));
        }
        line.push_str(&format!("  match {:.0}%", wine.match_score * 100.0));
        println!("{line}");
    }
}
