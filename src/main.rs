#[tokio::main]
async fn main() {
    if let Err(e) = notecards_lib::run().await {
        eprintln!("notecards: {e}");
        std::process::exit(1);
    }
}
