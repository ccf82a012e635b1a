//! Binary form of [`Options`] for handing a command line to another
//! running instance.
//!
//! Fields are written one after another in a fixed order, all integers
//! big-endian:
//!
//! | field             | encoding                                  |
//! |-------------------|-------------------------------------------|
//! | `player_action`   | i32 ordinal                               |
//! | `url_list_action` | i32 ordinal                               |
//! | `set_volume`      | i32, -1 when absent                       |
//! | `volume_modifier` | i32                                       |
//! | `seek_to`         | i32, -1 when absent                       |
//! | `play_track_at`   | i32, -1 when absent                       |
//! | `show_osd`        | u8, 0 or 1                                |
//! | `urls`            | u32 count, then per url u32 length + UTF-8 |
//!
//! Counts and lengths are u32, so a single URL is limited to 4 GiB and the
//! list to `u32::MAX` entries; anything an argument vector can hold fits.
//!
//! Only instances of the same build are expected to talk to each other, so
//! there is no version tag.

use std::io::{ self, Cursor, Read };

use byteorder::{ BigEndian, ByteOrder, ReadBytesExt };
use thiserror::Error;

use crate::options::{
    from_sentinel, to_sentinel, MediaUrl, Options, PlayerAction, UrlListAction,
};


/// Errors that can occur while decoding a message.
#[derive( Debug, Error, PartialEq, Eq )]
pub enum DecodeError {
    #[error( "Message ended in the middle of a field" )]
    Truncated,

    #[error( "Unknown player action: {0}" )]
    UnknownPlayerAction( i32 ),

    #[error( "Unknown url list action: {0}" )]
    UnknownUrlListAction( i32 ),

    #[error( "Invalid boolean byte: {0:#04x}" )]
    InvalidBool( u8 ),

    #[error( "Negative value {value} for {field}" )]
    NegativeValue {
        field: &'static str,
        value: i32,
    },

    #[error( "URL is not valid UTF-8" )]
    InvalidUtf8,

    #[error( "{0} unexpected bytes after the last field" )]
    TrailingBytes( usize ),
}


impl From<io::Error> for DecodeError {
    fn from( _: io::Error ) -> Self {
        // Reads only come from an in-memory slice, so running out of input
        // is the only way they fail.
        DecodeError::Truncated
    }
}


/// Encodes options into a self-contained message.
pub fn encode( options: &Options ) -> Vec<u8> {
    let url_bytes: usize = options.urls().iter().map( |url| 4 + url.as_str().len() ).sum();
    let mut buf = Vec::with_capacity( 6 * 4 + 1 + 4 + url_bytes );

    put_i32( &mut buf, options.player_action().ordinal() );
    put_i32( &mut buf, options.url_list_action().ordinal() );
    put_i32( &mut buf, to_sentinel( options.set_volume() ) );
    put_i32( &mut buf, options.volume_modifier() );
    put_i32( &mut buf, to_sentinel( options.seek_to() ) );
    put_i32( &mut buf, to_sentinel( options.play_track_at() ) );
    buf.push( u8::from( options.show_osd() ) );

    put_u32( &mut buf, wire_len( options.urls().len() ) );
    for url in options.urls() {
        let text = url.as_str().as_bytes();
        put_u32( &mut buf, wire_len( text.len() ) );
        buf.extend_from_slice( text );
    }

    tracing::debug!( "Encoded options into {} bytes", buf.len() );
    buf
}


/// Decodes a message produced by [`encode`].
///
/// The whole input must be consumed; nothing is returned on failure.
pub fn decode( bytes: &[u8] ) -> Result<Options, DecodeError> {
    let mut reader = Cursor::new( bytes );

    let player_action = PlayerAction::try_from( reader.read_i32::<BigEndian>()? )
        .map_err( DecodeError::UnknownPlayerAction )?;
    let url_list_action = UrlListAction::try_from( reader.read_i32::<BigEndian>()? )
        .map_err( DecodeError::UnknownUrlListAction )?;
    let set_volume = read_optional( &mut reader, "set_volume" )?;
    let volume_modifier = reader.read_i32::<BigEndian>()?;
    let seek_to = read_optional( &mut reader, "seek_to" )?;
    let play_track_at = read_optional( &mut reader, "play_track_at" )?;
    let show_osd = match reader.read_u8()? {
        0 => false,
        1 => true,
        other => return Err( DecodeError::InvalidBool( other ) ),
    };

    let count = reader.read_u32::<BigEndian>()? as usize;
    let mut urls = Vec::with_capacity( count.min( remaining( &reader ) / 4 ) );
    for _ in 0..count {
        urls.push( MediaUrl::remote( read_string( &mut reader )? ) );
    }

    let trailing = remaining( &reader );
    if trailing > 0 {
        return Err( DecodeError::TrailingBytes( trailing ) );
    }

    tracing::debug!( "Decoded options from {} bytes", bytes.len() );

    Ok( Options::builder()
        .player_action( player_action )
        .url_list_action( url_list_action )
        .set_volume( set_volume )
        .volume_modifier( volume_modifier )
        .seek_to( seek_to )
        .play_track_at( play_track_at )
        .show_osd( show_osd )
        .urls( urls )
        .build() )
}


fn put_i32( buf: &mut Vec<u8>, value: i32 ) {
    let mut word = [0u8; 4];
    BigEndian::write_i32( &mut word, value );
    buf.extend_from_slice( &word );
}


fn put_u32( buf: &mut Vec<u8>, value: u32 ) {
    let mut word = [0u8; 4];
    BigEndian::write_u32( &mut word, value );
    buf.extend_from_slice( &word );
}


/// Converts a count or byte length to its u32 wire form.
fn wire_len( len: usize ) -> u32 {
    debug_assert!( u32::try_from( len ).is_ok(), "length {} exceeds the u32 wire limit", len );
    u32::try_from( len ).unwrap_or( u32::MAX )
}


fn remaining( reader: &Cursor<&[u8]> ) -> usize {
    let len = reader.get_ref().len();
    len - ( reader.position() as usize ).min( len )
}


/// Reads an i32 slot where -1 means absent.
fn read_optional( reader: &mut Cursor<&[u8]>, field: &'static str ) -> Result<Option<u32>, DecodeError> {
    let value = reader.read_i32::<BigEndian>()?;
    if value < -1 {
        return Err( DecodeError::NegativeValue { field, value } );
    }
    Ok( from_sentinel( value ) )
}


fn read_string( reader: &mut Cursor<&[u8]> ) -> Result<String, DecodeError> {
    let len = reader.read_u32::<BigEndian>()? as usize;
    if len > remaining( reader ) {
        return Err( DecodeError::Truncated );
    }

    let mut bytes = vec![ 0u8; len ];
    reader.read_exact( &mut bytes )?;
    String::from_utf8( bytes ).map_err( |_| DecodeError::InvalidUtf8 )
}


#[cfg( test )]
mod tests {
    use super::*;
    use crate::parser::{ Invocation, OptionsParser };


    fn parsed( args: &[&str] ) -> Options {
        match OptionsParser::default().parse( args ) {
            Ok( Invocation::Run( options ) ) => options,
            other => panic!( "expected options, got {:?}", other ),
        }
    }


    #[test]
    fn test_default_layout() {
        let bytes = encode( &Options::default() );
        let expected: Vec<u8> = vec![
            0, 0, 0, 0,
            0, 0, 0, 0,
            0xff, 0xff, 0xff, 0xff,
            0, 0, 0, 0,
            0xff, 0xff, 0xff, 0xff,
            0xff, 0xff, 0xff, 0xff,
            0,
            0, 0, 0, 0,
        ];
        assert_eq!( bytes, expected );
    }


    #[test]
    fn test_field_layout() {
        let options = Options::builder()
            .player_action( PlayerAction::Next )
            .url_list_action( UrlListAction::Load )
            .set_volume( Some( 80 ) )
            .volume_modifier( -4 )
            .seek_to( Some( 300 ) )
            .play_track_at( Some( 2 ) )
            .show_osd( true )
            .url( MediaUrl::remote( "a://b" ) )
            .build();

        let bytes = encode( &options );
        assert_eq!( &bytes[ 0..4 ], &[ 0, 0, 0, 6 ] );
        assert_eq!( &bytes[ 4..8 ], &[ 0, 0, 0, 1 ] );
        assert_eq!( &bytes[ 8..12 ], &[ 0, 0, 0, 80 ] );
        assert_eq!( &bytes[ 12..16 ], &[ 0xff, 0xff, 0xff, 0xfc ] );
        assert_eq!( &bytes[ 16..20 ], &[ 0, 0, 1, 44 ] );
        assert_eq!( &bytes[ 20..24 ], &[ 0, 0, 0, 2 ] );
        assert_eq!( bytes[ 24 ], 1 );
        assert_eq!( &bytes[ 25..29 ], &[ 0, 0, 0, 1 ] );
        assert_eq!( &bytes[ 29..33 ], &[ 0, 0, 0, 5 ] );
        assert_eq!( &bytes[ 33.. ], b"a://b" );
    }


    #[test]
    fn test_round_trip_empty() {
        let options = Options::default();
        assert_eq!( decode( &encode( &options ) ), Ok( options ) );
    }


    #[test]
    fn test_round_trip_parsed() {
        let cases: [&[&str]; 6] = [
            &[ "-p" ],
            &[ "-l", "-t", "-v", "abc", "--seek-to", "12" ],
            &[ "--volume-down", "-k", "7", "-o" ],
            &[ "song.mp3", "http://example.com/x", "song.mp3" ],
            &[ "-s", "a.flac", "-a", "https://radio.example/stream?id=3", "b.ogg" ],
            &[ "-v", "150", "--volume-up", "-f", "-r" ],
        ];

        for args in cases {
            let options = parsed( args );
            assert_eq!( decode( &encode( &options ) ), Ok( options ), "{:?}", args );
        }
    }


    #[test]
    fn test_round_trip_unicode_url() {
        let options = Options::builder()
            .url( MediaUrl::remote( "http://example.com/Björk – Jóga.flac" ) )
            .build();
        assert_eq!( decode( &encode( &options ) ), Ok( options ) );
    }


    #[test]
    fn test_every_prefix_is_truncated() {
        let bytes = encode( &parsed( &[ "-p", "-v", "30", "x.mp3", "http://a/b" ] ) );
        for len in 0..bytes.len() {
            assert_eq!( decode( &bytes[ ..len ] ), Err( DecodeError::Truncated ), "prefix {}", len );
        }
    }


    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode( &Options::default() );
        bytes.extend_from_slice( &[ 1, 2 ] );
        assert_eq!( decode( &bytes ), Err( DecodeError::TrailingBytes( 2 ) ) );
    }


    #[test]
    fn test_unknown_actions_rejected() {
        let mut bytes = encode( &Options::default() );
        bytes[ 3 ] = 9;
        assert_eq!( decode( &bytes ), Err( DecodeError::UnknownPlayerAction( 9 ) ) );

        let mut bytes = encode( &Options::default() );
        bytes[ 7 ] = 2;
        assert_eq!( decode( &bytes ), Err( DecodeError::UnknownUrlListAction( 2 ) ) );
    }


    #[test]
    fn test_invalid_bool_rejected() {
        let mut bytes = encode( &Options::default() );
        bytes[ 24 ] = 2;
        assert_eq!( decode( &bytes ), Err( DecodeError::InvalidBool( 2 ) ) );
    }


    #[test]
    fn test_negative_value_other_than_sentinel_rejected() {
        let mut bytes = encode( &Options::default() );
        bytes[ 16..20 ].copy_from_slice( &( -2i32 ).to_be_bytes() );
        assert_eq!(
            decode( &bytes ),
            Err( DecodeError::NegativeValue { field: "seek_to", value: -2 } )
        );
    }


    #[test]
    fn test_invalid_utf8_rejected() {
        let mut bytes = encode( &Options::default() );
        bytes.truncate( 25 );
        bytes.extend_from_slice( &[ 0, 0, 0, 1, 0, 0, 0, 2, 0xc3, 0x28 ] );
        assert_eq!( decode( &bytes ), Err( DecodeError::InvalidUtf8 ) );
    }


    #[test]
    fn test_wire_len_within_limit() {
        assert_eq!( wire_len( 0 ), 0 );
        assert_eq!( wire_len( 5 ), 5 );
        assert_eq!( wire_len( u32::MAX as usize ), u32::MAX );
    }


    #[cfg( all( debug_assertions, target_pointer_width = "64" ) )]
    #[test]
    #[should_panic( expected = "exceeds the u32 wire limit" )]
    fn test_wire_len_over_limit_asserts() {
        wire_len( u32::MAX as usize + 1 );
    }


    #[test]
    fn test_huge_count_does_not_preallocate() {
        let mut bytes = encode( &Options::default() );
        bytes.truncate( 25 );
        bytes.extend_from_slice( &[ 0xff, 0xff, 0xff, 0xff ] );
        assert_eq!( decode( &bytes ), Err( DecodeError::Truncated ) );
    }
}
