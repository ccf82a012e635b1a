//! Log output setup.

use std::io;

use anyhow::{ anyhow, Result };
use tracing_subscriber::EnvFilter;


/// Installs the global subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over `default_filter`. Stdout is left alone
/// since it may carry an encoded message.
pub fn init( default_filter: &str ) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else( |_| EnvFilter::try_new( default_filter ) )
        .unwrap_or_else( |_| EnvFilter::new( "warn" ) );

    tracing_subscriber::fmt()
        .with_env_filter( filter )
        .with_writer( io::stderr )
        .try_init()
        .map_err( |e| anyhow!( "Failed to install log subscriber: {}", e ) )
}
