#[tokio::main]
async fn main() {
    sports_booking_backend::run().await;
}
