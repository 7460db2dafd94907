//! Simulator Spawn Demo
//!
//! Authenticates against the cloud platform, provisions one simulator
//! instance (optionally with a v3 cluster topology), prints its handle, and
//! releases it again.

use clap::Parser;

use qop_cloud::{ClusterConfig, QopCloud, QopVersion};
use qop_cloud_demos::{print_header, print_result, print_section, print_success};

#[derive(Parser, Debug)]
#[command(name = "demo-spawn")]
#[command(about = "Provision a cloud QoP simulator, print its handle, release it")]
struct Args {
    /// Account email
    #[arg(long, env = "QOP_EMAIL")]
    email: String,

    /// Account password
    #[arg(long, env = "QOP_PASSWORD", hide_env_values = true)]
    password: String,

    /// Endpoint host
    #[arg(long, default_value = qop_cloud::DEFAULT_HOST)]
    host: String,

    /// Endpoint port
    #[arg(long, default_value_t = qop_cloud::DEFAULT_PORT)]
    port: u16,

    /// Platform version (v2_1_3 .. v3_2_0, or "latest")
    #[arg(short, long, default_value = "latest")]
    version: QopVersion,

    /// Controller slots for LF FEMs, comma separated (v3 only)
    #[arg(long, value_delimiter = ',')]
    lf: Vec<u8>,

    /// Controller slots for MW FEMs, comma separated (v3 only)
    #[arg(long, value_delimiter = ',')]
    mw: Vec<u8>,

    /// Leave the simulator running instead of closing it
    #[arg(long)]
    keep: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    print_header("QoP Cloud Simulator Demo");

    print_section("Session");
    let client = QopCloud::connect_to(args.host, args.port, args.email, args.password)
        .await?
        .with_auto_cleanup(!args.keep);
    print_result("Endpoint", format!("{}:{}", client.host(), client.port()));
    print_success("Authenticated");

    let cluster_config = if args.lf.is_empty() && args.mw.is_empty() {
        None
    } else {
        let mut config = ClusterConfig::new();
        config
            .controller()?
            .lf_fems(args.lf.iter().copied())?
            .mw_fems(args.mw.iter().copied())?;
        Some(config)
    };

    print_section("Provisioning");
    print_result("Version", args.version);
    let mut sim = client.simulator(args.version, cluster_config)?;
    sim.spawn().await?;
    print_result("Instance", sim.id().unwrap_or_default());
    print_result(
        "Address",
        format!(
            "{}:{}",
            sim.host().unwrap_or_default(),
            sim.port().unwrap_or_default()
        ),
    );
    print_result(
        "Lease until",
        sim.expires_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    );
    print_result("Alive", sim.is_alive());

    print_section("Cleanup");
    if args.keep {
        print_success("Simulator left running until its lease expires");
    } else {
        sim.close().await?;
        print_success("Simulator released");
    }

    Ok(())
}
