//! Command-line argument parsing.
//!
//! The grammar is fixed: a handful of player and playlist switches, three
//! switches taking a number, and any number of files or URLs which may be
//! mixed in between the switches. Repeating a switch, or giving two switches
//! that set the same field, keeps the last one. Long switches may be
//! shortened to any unambiguous prefix (`--show` for `--show-osd`).

use std::io;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{ value_parser, Arg, ArgAction, ArgMatches, Command };
use thiserror::Error;

use crate::help::HelpLabels;
use crate::options::{
    from_sentinel, MediaUrl, Options, PlayerAction, UrlListAction, VOLUME_STEP,
};


const HELP: &str = "help";
const VOLUME: &str = "volume";
const VOLUME_UP: &str = "volume-up";
const VOLUME_DOWN: &str = "volume-down";
const SEEK_TO: &str = "seek-to";
const APPEND: &str = "append";
const LOAD: &str = "load";
const PLAY_TRACK: &str = "play-track";
const SHOW_OSD: &str = "show-osd";
const URLS: &str = "urls";

/// Player switches: argument id, short form, resulting action.
const PLAYER_SWITCHES: [( &str, char, PlayerAction ); 6] = [
    ( "play", 'p', PlayerAction::Play ),
    ( "play-pause", 't', PlayerAction::PlayPause ),
    ( "pause", 'u', PlayerAction::Pause ),
    ( "stop", 's', PlayerAction::Stop ),
    ( "previous", 'r', PlayerAction::Previous ),
    ( "next", 'f', PlayerAction::Next ),
];


/// Errors that abort argument parsing.
#[derive( Debug, Error )]
pub enum ParseError {
    /// Unknown switch, or a switch missing its value.
    #[error( "{0}" )]
    Invalid( #[from] clap::Error ),

    #[error( "Cannot resolve path '{}': {source}", .path.display() )]
    ResolvePath {
        path: PathBuf,
        source: io::Error,
    },
}


/// What the invocation asked for.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum Invocation {
    /// Carry out these options.
    Run( Options ),

    /// Help was requested. Holds the text to print; nothing else should run.
    Help( String ),
}


/// Parses argument lists into [`Options`].
#[derive( Debug, Clone )]
pub struct OptionsParser {
    command: Command,
    help: String,
}


impl Default for OptionsParser {
    fn default() -> Self {
        Self::new( &HelpLabels::default() )
    }
}


impl OptionsParser {
    /// Creates a parser whose help text uses the given labels.
    pub fn new( labels: &HelpLabels ) -> Self {
        let help = labels.render();
        Self {
            command: build_command( &help ),
            help,
        }
    }


    /// Returns the help text this parser prints for `-h`.
    pub fn help_text( &self ) -> &str {
        &self.help
    }


    /// Parses an argument list.
    ///
    /// @param args - The arguments, without the program name
    ///
    /// @returns The requested invocation, or why the arguments were rejected
    pub fn parse<I, T>( &self, args: I ) -> Result<Invocation, ParseError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = match self.command.clone().try_get_matches_from( args ) {
            Ok( matches ) => matches,
            Err( e ) if e.kind() == ErrorKind::DisplayHelp => {
                return Ok( Invocation::Help( self.help.clone() ) );
            }
            Err( e ) => return Err( ParseError::Invalid( e ) ),
        };

        let player_switches = PLAYER_SWITCHES.map( |( id, _, action )| ( id, action ) );
        let player_action = last_of( &matches, &player_switches ).unwrap_or_default();
        let url_list_action = last_of(
            &matches,
            &[ ( APPEND, UrlListAction::Append ), ( LOAD, UrlListAction::Load ) ],
        ).unwrap_or_default();
        let volume_modifier = last_of(
            &matches,
            &[ ( VOLUME_UP, VOLUME_STEP ), ( VOLUME_DOWN, -VOLUME_STEP ) ],
        ).unwrap_or( 0 );

        let mut urls = Vec::new();
        if let Some( values ) = matches.get_many::<PathBuf>( URLS ) {
            for path in values {
                let url = MediaUrl::classify( path )
                    .map_err( |source| ParseError::ResolvePath { path: path.clone(), source } )?;
                urls.push( url );
            }
        }

        let options = Options::builder()
            .player_action( player_action )
            .url_list_action( url_list_action )
            .set_volume( numeric( &matches, VOLUME ) )
            .volume_modifier( volume_modifier )
            .seek_to( numeric( &matches, SEEK_TO ) )
            .play_track_at( numeric( &matches, PLAY_TRACK ) )
            .show_osd( given( &matches, SHOW_OSD ) )
            .urls( urls )
            .build();

        tracing::debug!( "Parsed command line: {:?}", options );
        Ok( Invocation::Run( options ) )
    }
}


/// Builds the clap command for the fixed grammar.
fn build_command( help: &str ) -> Command {
    let mut command = Command::new( "lyra" )
        .no_binary_name( true )
        .disable_help_flag( true )
        .disable_version_flag( true )
        .args_override_self( true )
        .infer_long_args( true )
        .override_help( help.to_owned() )
        .arg( Arg::new( HELP ).short( 'h' ).long( HELP ).action( ArgAction::Help ) );

    for ( id, short, _ ) in PLAYER_SWITCHES {
        command = command.arg( switch( id ).short( short ) );
    }

    command
        .arg( numeric_arg( VOLUME ).short( 'v' ) )
        .arg( switch( VOLUME_UP ) )
        .arg( switch( VOLUME_DOWN ) )
        .arg( numeric_arg( SEEK_TO ) )
        .arg( switch( APPEND ).short( 'a' ) )
        .arg( switch( LOAD ).short( 'l' ) )
        .arg( numeric_arg( PLAY_TRACK ).short( 'k' ) )
        .arg( switch( SHOW_OSD ).short( 'o' ) )
        .arg(
            Arg::new( URLS )
                .action( ArgAction::Append )
                .num_args( 1.. )
                .value_parser( value_parser!( PathBuf ) ),
        )
}


fn switch( id: &'static str ) -> Arg {
    Arg::new( id ).long( id ).action( ArgAction::SetTrue )
}


/// A switch with a required value. The value may start with `-`, so
/// `-v -5` reads `-5` as the volume rather than as another switch.
fn numeric_arg( id: &'static str ) -> Arg {
    Arg::new( id )
        .long( id )
        .action( ArgAction::Append )
        .num_args( 1 )
        .allow_hyphen_values( true )
}


/// Whether a switch was typed, ignoring implicit defaults.
fn given( matches: &ArgMatches, id: &str ) -> bool {
    matches.value_source( id ) == Some( ValueSource::CommandLine )
}


/// Position of the last occurrence of a typed switch.
fn last_index( matches: &ArgMatches, id: &str ) -> Option<usize> {
    if !given( matches, id ) {
        return None;
    }
    matches.indices_of( id ).and_then( |indices| indices.max() )
}


/// Picks the value of whichever switch in the group was typed last.
fn last_of<T: Copy>( matches: &ArgMatches, group: &[( &str, T )] ) -> Option<T> {
    group.iter()
        .filter_map( |&( id, value )| last_index( matches, id ).map( |index| ( index, value ) ) )
        .max_by_key( |&( index, _ )| index )
        .map( |( _, value )| value )
}


/// Reads the last value given for a numeric switch.
///
/// Text that is not an integer, and negative numbers, both count as absent.
fn numeric( matches: &ArgMatches, id: &str ) -> Option<u32> {
    let raw = matches.get_many::<String>( id )?.last()?;
    match raw.trim().parse::<i32>() {
        Ok( value ) => from_sentinel( value ),
        Err( _ ) => {
            tracing::debug!( "Ignoring malformed value for --{}: {:?}", id, raw );
            None
        }
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    fn run( args: &[&str] ) -> Options {
        match OptionsParser::default().parse( args ) {
            Ok( Invocation::Run( options ) ) => options,
            other => panic!( "expected options for {:?}, got {:?}", args, other ),
        }
    }


    fn local( name: &str ) -> MediaUrl {
        MediaUrl::from_local_file( &std::env::current_dir().unwrap().join( name ) )
    }


    #[test]
    fn test_no_arguments_is_empty() {
        let options = run( &[] );
        assert!( options.is_empty() );
        assert_eq!( options, Options::default() );
    }


    #[test]
    fn test_player_switches() {
        let cases = [
            ( "-p", PlayerAction::Play ),
            ( "--play", PlayerAction::Play ),
            ( "-t", PlayerAction::PlayPause ),
            ( "--play-pause", PlayerAction::PlayPause ),
            ( "-u", PlayerAction::Pause ),
            ( "--pause", PlayerAction::Pause ),
            ( "-s", PlayerAction::Stop ),
            ( "--stop", PlayerAction::Stop ),
            ( "-r", PlayerAction::Previous ),
            ( "--previous", PlayerAction::Previous ),
            ( "-f", PlayerAction::Next ),
            ( "--next", PlayerAction::Next ),
        ];

        for ( flag, action ) in cases {
            let options = run( &[ flag ] );
            assert_eq!( options.player_action(), action, "{}", flag );
            assert!( !options.is_empty() );
        }
    }


    #[test]
    fn test_last_player_switch_wins() {
        assert_eq!( run( &[ "-p", "-s" ] ).player_action(), PlayerAction::Stop );
        assert_eq!( run( &[ "-s", "-p" ] ).player_action(), PlayerAction::Play );
        assert_eq!( run( &[ "-p", "-s", "-p" ] ).player_action(), PlayerAction::Play );
        assert_eq!( run( &[ "-ps" ] ).player_action(), PlayerAction::Stop );
        assert_eq!( run( &[ "--next", "-r" ] ).player_action(), PlayerAction::Previous );
    }


    #[test]
    fn test_last_url_list_switch_wins() {
        assert_eq!( run( &[ "-a", "-l" ] ).url_list_action(), UrlListAction::Load );
        assert_eq!( run( &[ "-l", "-a" ] ).url_list_action(), UrlListAction::Append );
        assert_eq!( run( &[ "--load" ] ).url_list_action(), UrlListAction::Load );
        assert_eq!( run( &[] ).url_list_action(), UrlListAction::Append );
    }


    #[test]
    fn test_url_list_switch_alone_is_empty() {
        assert!( run( &[ "-l" ] ).is_empty() );
    }


    #[test]
    fn test_volume() {
        assert_eq!( run( &[ "-v", "50" ] ).set_volume(), Some( 50 ) );
        assert_eq!( run( &[ "--volume", "75" ] ).set_volume(), Some( 75 ) );
        assert_eq!( run( &[ "--volume=20" ] ).set_volume(), Some( 20 ) );
        assert_eq!( run( &[ "-v30" ] ).set_volume(), Some( 30 ) );
        assert_eq!( run( &[ "-v", "10", "-v", "90" ] ).set_volume(), Some( 90 ) );
    }


    #[test]
    fn test_volume_out_of_range_passes_through() {
        assert_eq!( run( &[ "-v", "150" ] ).set_volume(), Some( 150 ) );
    }


    #[test]
    fn test_malformed_number_becomes_absent() {
        let options = run( &[ "--volume", "notanumber" ] );
        assert_eq!( options.set_volume(), None );
        assert!( options.is_empty() );

        assert_eq!( run( &[ "--seek-to", "1:30" ] ).seek_to(), None );
        assert_eq!( run( &[ "-k", "" ] ).play_track_at(), None );
    }


    #[test]
    fn test_malformed_number_overrides_earlier_value() {
        assert_eq!( run( &[ "-v", "40", "-v", "loud" ] ).set_volume(), None );
    }


    #[test]
    fn test_malformed_number_keeps_parsing() {
        let options = run( &[ "-v", "abc", "-p", "-o" ] );
        assert_eq!( options.set_volume(), None );
        assert_eq!( options.player_action(), PlayerAction::Play );
        assert!( options.show_osd() );
    }


    #[test]
    fn test_negative_number_becomes_absent() {
        let options = run( &[ "-v", "-5" ] );
        assert_eq!( options.set_volume(), None );
        assert!( options.urls().is_empty() );
    }


    #[test]
    fn test_repeated_switches_accepted() {
        assert!( run( &[ "-o", "-o" ] ).show_osd() );
        assert!( run( &[ "-oo" ] ).show_osd() );
        assert_eq!( run( &[ "-l", "-a", "-l", "-a" ] ).url_list_action(), UrlListAction::Append );
        assert_eq!( run( &[ "-a", "-l", "-a", "-l" ] ).url_list_action(), UrlListAction::Load );
        assert_eq!( run( &[ "--stop", "--stop" ] ).player_action(), PlayerAction::Stop );
        assert_eq!(
            run( &[ "--volume-up", "--volume-down", "--volume-up" ] ).volume_modifier(),
            VOLUME_STEP
        );
        assert_eq!(
            run( &[ "--volume-down", "--volume-up", "--volume-down" ] ).volume_modifier(),
            -VOLUME_STEP
        );
    }


    #[test]
    fn test_volume_step() {
        assert_eq!( run( &[ "--volume-up" ] ).volume_modifier(), VOLUME_STEP );
        assert_eq!( run( &[ "--volume-down" ] ).volume_modifier(), -VOLUME_STEP );
        assert_eq!( run( &[ "--volume-up", "--volume-down" ] ).volume_modifier(), -VOLUME_STEP );
        assert_eq!( run( &[ "--volume-down", "--volume-up" ] ).volume_modifier(), VOLUME_STEP );
        assert_eq!( run( &[ "--volume-up", "--volume-up" ] ).volume_modifier(), VOLUME_STEP );
    }


    #[test]
    fn test_seek_and_play_track() {
        let options = run( &[ "--seek-to", "90", "-k", "3" ] );
        assert_eq!( options.seek_to(), Some( 90 ) );
        assert_eq!( options.play_track_at(), Some( 3 ) );

        assert_eq!( run( &[ "--play-track", "0" ] ).play_track_at(), Some( 0 ) );
    }


    #[test]
    fn test_show_osd() {
        assert!( run( &[ "-o" ] ).show_osd() );
        assert!( run( &[ "--show-osd" ] ).show_osd() );
        assert!( !run( &[ "-p" ] ).show_osd() );
    }


    #[test]
    fn test_positional_classification() {
        let options = run( &[ "song.mp3", "http://example.com/x" ] );

        assert_eq!( options.urls().len(), 2 );
        assert_eq!( options.urls()[ 0 ], local( "song.mp3" ) );
        assert!( options.urls()[ 0 ].is_local_file() );
        assert_eq!( options.urls()[ 1 ].as_str(), "http://example.com/x" );
    }


    #[test]
    fn test_interspersed_positionals_keep_order() {
        let options = run( &[ "-p", "a.mp3", "-o", "b.mp3" ] );

        assert_eq!( options.player_action(), PlayerAction::Play );
        assert!( options.show_osd() );
        assert_eq!( options.urls(), &[ local( "a.mp3" ), local( "b.mp3" ) ] );
    }


    #[test]
    fn test_duplicate_urls_kept() {
        let options = run( &[ "http://a/x", "-l", "http://a/x" ] );
        assert_eq!( options.urls().len(), 2 );
        assert_eq!( options.url_list_action(), UrlListAction::Load );
    }


    #[test]
    fn test_double_dash_ends_switches() {
        let options = run( &[ "-p", "--", "-s" ] );
        assert_eq!( options.player_action(), PlayerAction::Play );
        assert_eq!( options.urls(), &[ local( "-s" ) ] );
    }


    #[test]
    fn test_help_short_circuits() {
        let parser = OptionsParser::default();
        for args in [ &[ "-h" ][ .. ], &[ "--help" ], &[ "-h", "-p" ], &[ "-p", "--help", "x.mp3" ] ] {
            match parser.parse( args ) {
                Ok( Invocation::Help( text ) ) => assert_eq!( text, parser.help_text() ),
                other => panic!( "expected help for {:?}, got {:?}", args, other ),
            }
        }
    }


    #[test]
    fn test_help_uses_labels() {
        let labels = HelpLabels { usage: "Uso".into(), ..HelpLabels::default() };
        let parser = OptionsParser::new( &labels );

        match parser.parse( [ "-h" ] ) {
            Ok( Invocation::Help( text ) ) => assert!( text.starts_with( "Uso: lyra" ) ),
            other => panic!( "expected help, got {:?}", other ),
        }
    }


    #[test]
    fn test_unknown_switch_fails() {
        let result = OptionsParser::default().parse( [ "--not-a-flag" ] );
        assert!( matches!( result, Err( ParseError::Invalid( _ ) ) ) );

        let result = OptionsParser::default().parse( [ "-x" ] );
        assert!( matches!( result, Err( ParseError::Invalid( _ ) ) ) );
    }


    #[test]
    fn test_missing_value_fails() {
        for args in [ &[ "-v" ][ .. ], &[ "-p", "--seek-to" ], &[ "-k" ] ] {
            let result = OptionsParser::default().parse( args );
            assert!( matches!( result, Err( ParseError::Invalid( _ ) ) ), "{:?}", args );
        }
    }


    #[test]
    fn test_unambiguous_long_prefix_accepted() {
        assert_eq!( run( &[ "--play-p" ] ).player_action(), PlayerAction::PlayPause );
        assert!( run( &[ "--show" ] ).show_osd() );
        assert_eq!( run( &[ "--seek", "12" ] ).seek_to(), Some( 12 ) );
        assert_eq!( run( &[ "--prev" ] ).player_action(), PlayerAction::Previous );
        assert_eq!( run( &[ "--volume-u" ] ).volume_modifier(), VOLUME_STEP );
    }


    #[test]
    fn test_exact_long_name_beats_longer_switches() {
        assert_eq!( run( &[ "--play" ] ).player_action(), PlayerAction::Play );
        assert_eq!( run( &[ "--volume", "30" ] ).set_volume(), Some( 30 ) );
    }


    #[test]
    fn test_ambiguous_long_prefix_fails() {
        for args in [ &[ "--vol" ][ .. ], &[ "--play-" ], &[ "--p" ] ] {
            let result = OptionsParser::default().parse( args );
            assert!( matches!( result, Err( ParseError::Invalid( _ ) ) ), "{:?}", args );
        }
    }


    #[test]
    fn test_switches_take_no_value() {
        let result = OptionsParser::default().parse( [ "--play=now" ] );
        assert!( matches!( result, Err( ParseError::Invalid( _ ) ) ) );
    }


    #[test]
    fn test_empty_positional_fails() {
        assert!( OptionsParser::default().parse( [ "" ] ).is_err() );
    }
}
