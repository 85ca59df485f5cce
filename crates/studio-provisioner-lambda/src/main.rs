// AWS Lambda binary entry point
//
// Build with: cargo build -p studio-provisioner-lambda
// The same `bootstrap` serves both custom resources; the function's
// STUDIO_PROVISIONER_HANDLER_KIND selects domain or profile.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    studio_provisioner_lambda::run().await
}
