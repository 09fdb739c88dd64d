//! pitchdesk server binary.

#[tokio::main]
async fn main() {
    pitchdesk::web::run().await;
}
