//! Application settings
//!
//! Read from `settings.json` in the user's config directory. Every field is
//! optional in the file; missing ones take their defaults.

use std::fs;
use std::path::PathBuf;

use anyhow::{ Context, Result };
use lyra_core::HelpLabels;
use serde::Deserialize;


/// Application settings.
#[derive( Debug, Clone, Deserialize )]
#[serde( default )]
pub struct Settings {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,

    /// Translated labels for the help text.
    pub help_labels: HelpLabels,
}


impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            help_labels: HelpLabels::default(),
        }
    }
}


impl Settings {
    /// Returns the path to the settings file.
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map( |p| p.join( "lyra" ).join( "settings.json" ) )
    }


    /// Loads settings from disk.
    ///
    /// A missing file or config directory yields the defaults; a file that
    /// cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        let path = match Self::settings_path() {
            Some( p ) => p,
            None => return Ok( Self::default() ),
        };

        if !path.exists() {
            return Ok( Self::default() );
        }

        let contents = fs::read_to_string( &path )
            .with_context( || format!( "Failed to read {}", path.display() ) )?;
        Self::from_json( &contents )
            .with_context( || format!( "Failed to parse {}", path.display() ) )
    }


    fn from_json( contents: &str ) -> Result<Self> {
        Ok( serde_json::from_str( contents )? )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_empty_object_gives_defaults() {
        let settings = Settings::from_json( "{}" ).unwrap();
        assert_eq!( settings.log_filter, "warn" );
        assert_eq!( settings.help_labels, HelpLabels::default() );
    }


    #[test]
    fn test_partial_labels() {
        let settings = Settings::from_json(
            r#"{ "log_filter": "lyra_core=debug", "help_labels": { "usage": "Verwendung" } }"#
        ).unwrap();

        assert_eq!( settings.log_filter, "lyra_core=debug" );
        assert_eq!( settings.help_labels.usage, "Verwendung" );
        assert_eq!( settings.help_labels.stop, HelpLabels::default().stop );
    }


    #[test]
    fn test_malformed_json_is_error() {
        assert!( Settings::from_json( "{ log_filter" ).is_err() );
    }
}
