use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "dynawire")]
#[command(
    version,
    about = "Send one signed DynamoDB JSON request and print the response",
    long_about = None
)]
pub struct Cli {
    /// Operation name (`PutItem`) or fully qualified target
    /// (`DynamoDBStreams_20120810.GetRecords`).
    pub target: String,

    /// JSON request body. Use `-` to read it from stdin.
    #[arg(default_value = "{}")]
    pub body: String,

    /// Service endpoint. Overrides `DYNAMODB_ENDPOINT`.
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Signing region. Overrides `AWS_REGION`.
    #[arg(short, long)]
    pub region: Option<String>,

    /// Send the request unsigned, even when credentials are configured.
    #[arg(long)]
    pub anonymous: bool,

    /// Log the raw request and response on the `dynawire::wire` target.
    #[arg(short, long)]
    pub debug: bool,

    /// Print the response body exactly as received.
    #[arg(long)]
    pub raw: bool,
}
