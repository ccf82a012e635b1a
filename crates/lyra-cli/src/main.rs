//! Lyra CLI - Command-line entry point
//!
//! Parses the command line and hands the result on: help goes to stdout,
//! argument errors end the process, and parsed options are either shown
//! (interactive terminal) or written to stdout in their encoded form for
//! whatever forwards them to the running player.

mod logging;
mod settings;

use std::env;
use std::io::{ self, IsTerminal, Write };

use anyhow::Result;

use lyra_core::{ encode, Invocation, Options, OptionsParser, ParseError };
use settings::Settings;


fn main() -> Result<()> {
    let ( settings, settings_error ) = match Settings::load() {
        Ok( settings ) => ( settings, None ),
        Err( e ) => ( Settings::default(), Some( e ) ),
    };

    logging::init( &settings.log_filter )?;
    if let Some( e ) = settings_error {
        tracing::warn!( "Using default settings: {:#}", e );
    }

    let parser = OptionsParser::new( &settings.help_labels );
    let options = match parser.parse( env::args_os().skip( 1 ) ) {
        Ok( Invocation::Help( text ) ) => {
            print!( "{}", text );
            return Ok(());
        }
        Ok( Invocation::Run( options ) ) => options,
        Err( ParseError::Invalid( e ) ) => e.exit(),
        Err( e ) => return Err( e.into() ),
    };

    hand_off( &options )
}


/// Shows or emits the parsed options.
fn hand_off( options: &Options ) -> Result<()> {
    let mut stdout = io::stdout().lock();

    if options.is_empty() {
        tracing::info!( "No actions on the command line" );
    } else {
        tracing::info!(
            "Command line: action={}, urls={} ({}), osd={}",
            options.player_action(),
            options.urls().len(),
            options.url_list_action(),
            options.show_osd()
        );
    }

    if stdout.is_terminal() {
        if !options.is_empty() {
            write!( stdout, "{}", options )?;
        }
        return Ok(());
    }

    let message = encode( options );
    stdout.write_all( &message )?;
    stdout.flush()?;
    tracing::debug!( "Wrote {} byte message to stdout", message.len() );

    Ok(())
}
