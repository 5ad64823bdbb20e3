use std::io;

use smsgate::{DispatchClient, DispatchOptions, DispatchRequest, Region, VoipStrategy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let phone = std::env::var("SMSGATE_PHONE").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SMSGATE_PHONE environment variable is required",
        )
    })?;
    let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_owned());

    let client = DispatchClient::from_env(Region::new(region)?)?;
    let request = DispatchRequest::with_generated_code(phone, 6).options(DispatchOptions {
        voip_screening: Some(VoipStrategy::Heuristic),
        ..DispatchOptions::default()
    });

    let report = client.send_verification(&request).await;
    println!(
        "success: {}, message id: {:?}, error: {:?}",
        report.success, report.message_id, report.error
    );

    Ok(())
}
