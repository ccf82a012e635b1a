//! Parsed command-line intent.
//!
//! An [`Options`] value describes what a single invocation asked the player
//! to do. It is produced once, either by the parser or by decoding a message
//! from another instance, and is read-only afterwards.

use std::fmt;
use std::io;
use std::path::{ Path, PathBuf };


/// Largest numeric value that fits the signed 32-bit wire slot.
pub const MAX_NUMERIC_VALUE: u32 = i32::MAX as u32;

/// Relative volume step applied by `--volume-up` / `--volume-down`.
pub const VOLUME_STEP: i32 = 4;

const FILE_SCHEME: &str = "file://";


/// Player command requested on the command line.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
#[repr( i32 )]
pub enum PlayerAction {
    #[default]
    None = 0,
    Play = 1,
    PlayPause = 2,
    Pause = 3,
    Stop = 4,
    Previous = 5,
    Next = 6,
}


impl PlayerAction {
    /// Returns the fixed wire ordinal of this action.
    pub fn ordinal( self ) -> i32 {
        self as i32
    }
}


impl TryFrom<i32> for PlayerAction {
    type Error = i32;


    fn try_from( value: i32 ) -> Result<Self, Self::Error> {
        match value {
            0 => Ok( PlayerAction::None ),
            1 => Ok( PlayerAction::Play ),
            2 => Ok( PlayerAction::PlayPause ),
            3 => Ok( PlayerAction::Pause ),
            4 => Ok( PlayerAction::Stop ),
            5 => Ok( PlayerAction::Previous ),
            6 => Ok( PlayerAction::Next ),
            other => Err( other ),
        }
    }
}


impl fmt::Display for PlayerAction {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        let name = match self {
            PlayerAction::None => "none",
            PlayerAction::Play => "play",
            PlayerAction::PlayPause => "play-pause",
            PlayerAction::Pause => "pause",
            PlayerAction::Stop => "stop",
            PlayerAction::Previous => "previous",
            PlayerAction::Next => "next",
        };
        f.write_str( name )
    }
}


/// How the given URLs are merged into the playlist.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Default )]
#[repr( i32 )]
pub enum UrlListAction {
    #[default]
    Append = 0,
    Load = 1,
}


impl UrlListAction {
    /// Returns the fixed wire ordinal of this action.
    pub fn ordinal( self ) -> i32 {
        self as i32
    }
}


impl TryFrom<i32> for UrlListAction {
    type Error = i32;


    fn try_from( value: i32 ) -> Result<Self, Self::Error> {
        match value {
            0 => Ok( UrlListAction::Append ),
            1 => Ok( UrlListAction::Load ),
            other => Err( other ),
        }
    }
}


impl fmt::Display for UrlListAction {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        match self {
            UrlListAction::Append => f.write_str( "append" ),
            UrlListAction::Load => f.write_str( "load" ),
        }
    }
}


/// A playlist entry given on the command line.
///
/// Either a remote URL kept exactly as typed, or a `file://` URL built from
/// an absolute local path.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct MediaUrl( String );


impl MediaUrl {
    /// Wraps a URL string without interpreting it.
    pub fn remote( url: impl Into<String> ) -> Self {
        Self( url.into() )
    }


    /// Builds a `file://` URL from an absolute path.
    #[cfg( not( windows ) )]
    pub fn from_local_file( path: &Path ) -> Self {
        Self( format!( "{}{}", FILE_SCHEME, path.to_string_lossy() ) )
    }


    /// Builds a `file://` URL from an absolute path.
    #[cfg( windows )]
    pub fn from_local_file( path: &Path ) -> Self {
        let text = path.to_string_lossy().replace( '\\', "/" );
        Self( format!( "{}/{}", FILE_SCHEME, text ) )
    }


    /// Classifies a bare command-line argument.
    ///
    /// Anything containing `://` is taken as a URL. Everything else is a
    /// filesystem path, made absolute against the current directory.
    ///
    /// @param arg - The positional argument as typed
    ///
    /// @returns The classified URL, or the error from resolving the path
    pub fn classify( arg: &Path ) -> io::Result<Self> {
        let text = arg.to_string_lossy();
        if text.contains( "://" ) {
            return Ok( Self::remote( text.into_owned() ) );
        }

        let absolute = std::path::absolute( arg )?;
        Ok( Self::from_local_file( &absolute ) )
    }


    /// Returns the URL text.
    pub fn as_str( &self ) -> &str {
        &self.0
    }


    /// Whether this URL points at a local file.
    pub fn is_local_file( &self ) -> bool {
        self.0.starts_with( FILE_SCHEME )
    }


    /// Returns the local path for `file://` URLs.
    #[cfg( not( windows ) )]
    pub fn to_file_path( &self ) -> Option<PathBuf> {
        self.0.strip_prefix( FILE_SCHEME ).map( PathBuf::from )
    }


    /// Returns the local path for `file://` URLs.
    #[cfg( windows )]
    pub fn to_file_path( &self ) -> Option<PathBuf> {
        self.0.strip_prefix( FILE_SCHEME )
            .map( |rest| rest.strip_prefix( '/' ).unwrap_or( rest ) )
            .map( |rest| PathBuf::from( rest.replace( '/', "\\" ) ) )
    }
}


impl fmt::Display for MediaUrl {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        f.write_str( &self.0 )
    }
}


/// Everything a single invocation asked for.
#[derive( Debug, Clone, PartialEq, Eq, Default )]
pub struct Options {
    player_action: PlayerAction,
    url_list_action: UrlListAction,
    set_volume: Option<u32>,
    volume_modifier: i32,
    seek_to: Option<u32>,
    play_track_at: Option<u32>,
    show_osd: bool,
    urls: Vec<MediaUrl>,
}


impl Options {
    /// Starts building an Options value from defaults.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }


    pub fn player_action( &self ) -> PlayerAction {
        self.player_action
    }


    pub fn url_list_action( &self ) -> UrlListAction {
        self.url_list_action
    }


    /// Absolute volume in percent. Not range-checked.
    pub fn set_volume( &self ) -> Option<u32> {
        self.set_volume
    }


    /// Relative volume change; zero means unchanged.
    pub fn volume_modifier( &self ) -> i32 {
        self.volume_modifier
    }


    /// Seek target in seconds.
    pub fn seek_to( &self ) -> Option<u32> {
        self.seek_to
    }


    /// Playlist index to start playing.
    pub fn play_track_at( &self ) -> Option<u32> {
        self.play_track_at
    }


    pub fn show_osd( &self ) -> bool {
        self.show_osd
    }


    /// URLs in the order they appeared on the command line.
    pub fn urls( &self ) -> &[MediaUrl] {
        &self.urls
    }


    /// Returns true if no action at all was requested.
    ///
    /// `url_list_action` is not part of the check.
    pub fn is_empty( &self ) -> bool {
        self.player_action == PlayerAction::None
            && self.set_volume.is_none()
            && self.volume_modifier == 0
            && self.seek_to.is_none()
            && self.play_track_at.is_none()
            && !self.show_osd
            && self.urls.is_empty()
    }
}


impl fmt::Display for Options {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
        if self.is_empty() {
            return writeln!( f, "no command-line actions" );
        }

        if self.player_action != PlayerAction::None {
            writeln!( f, "player action: {}", self.player_action )?;
        }
        if let Some( volume ) = self.set_volume {
            writeln!( f, "set volume: {}%", volume )?;
        }
        if self.volume_modifier != 0 {
            writeln!( f, "volume change: {:+}%", self.volume_modifier )?;
        }
        if let Some( seconds ) = self.seek_to {
            writeln!( f, "seek to: {}s", seconds )?;
        }
        if let Some( index ) = self.play_track_at {
            writeln!( f, "play track: {}", index )?;
        }
        if self.show_osd {
            writeln!( f, "show osd" )?;
        }
        if !self.urls.is_empty() {
            writeln!( f, "urls ({}):", self.url_list_action )?;
            for url in &self.urls {
                writeln!( f, "  {}", url )?;
            }
        }

        Ok(())
    }
}


/// Converts a signed value using the "-1 means absent" convention.
///
/// Any negative value is treated as absent.
pub fn from_sentinel( value: i32 ) -> Option<u32> {
    u32::try_from( value ).ok()
}


/// Converts an optional value back to the signed sentinel form.
pub fn to_sentinel( value: Option<u32> ) -> i32 {
    value
        .map( |v| i32::try_from( v ).unwrap_or( i32::MAX ) )
        .unwrap_or( -1 )
}


/// Incremental construction of an [`Options`] value.
///
/// Every setter overwrites what was set before.
#[derive( Debug, Clone, Default )]
pub struct OptionsBuilder {
    options: Options,
}


impl OptionsBuilder {
    pub fn player_action( mut self, action: PlayerAction ) -> Self {
        self.options.player_action = action;
        self
    }


    pub fn url_list_action( mut self, action: UrlListAction ) -> Self {
        self.options.url_list_action = action;
        self
    }


    /// Values above [`MAX_NUMERIC_VALUE`] are clamped.
    pub fn set_volume( mut self, volume: Option<u32> ) -> Self {
        self.options.set_volume = clamp( volume );
        self
    }


    pub fn volume_modifier( mut self, modifier: i32 ) -> Self {
        self.options.volume_modifier = modifier;
        self
    }


    /// Values above [`MAX_NUMERIC_VALUE`] are clamped.
    pub fn seek_to( mut self, seconds: Option<u32> ) -> Self {
        self.options.seek_to = clamp( seconds );
        self
    }


    /// Values above [`MAX_NUMERIC_VALUE`] are clamped.
    pub fn play_track_at( mut self, index: Option<u32> ) -> Self {
        self.options.play_track_at = clamp( index );
        self
    }


    pub fn show_osd( mut self, show: bool ) -> Self {
        self.options.show_osd = show;
        self
    }


    /// Appends a URL after the ones already added.
    pub fn url( mut self, url: MediaUrl ) -> Self {
        self.options.urls.push( url );
        self
    }


    pub fn urls( mut self, urls: impl IntoIterator<Item = MediaUrl> ) -> Self {
        self.options.urls.extend( urls );
        self
    }


    pub fn build( self ) -> Options {
        self.options
    }
}


fn clamp( value: Option<u32> ) -> Option<u32> {
    value.map( |v| v.min( MAX_NUMERIC_VALUE ) )
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_default_is_empty() {
        assert!( Options::default().is_empty() );
        assert!( Options::builder().build().is_empty() );
    }


    #[test]
    fn test_url_list_action_alone_is_empty() {
        let options = Options::builder().url_list_action( UrlListAction::Load ).build();
        assert!( options.is_empty() );
    }


    #[test]
    fn test_any_field_makes_non_empty() {
        let variants = [
            Options::builder().player_action( PlayerAction::Stop ).build(),
            Options::builder().set_volume( Some( 0 ) ).build(),
            Options::builder().volume_modifier( -VOLUME_STEP ).build(),
            Options::builder().seek_to( Some( 0 ) ).build(),
            Options::builder().play_track_at( Some( 3 ) ).build(),
            Options::builder().show_osd( true ).build(),
            Options::builder().url( MediaUrl::remote( "http://example.com/x" ) ).build(),
        ];

        for options in variants {
            assert!( !options.is_empty(), "{:?}", options );
        }
    }


    #[test]
    fn test_ordinals_are_fixed() {
        assert_eq!( PlayerAction::None.ordinal(), 0 );
        assert_eq!( PlayerAction::Next.ordinal(), 6 );
        assert_eq!( UrlListAction::Load.ordinal(), 1 );
        assert_eq!( PlayerAction::try_from( 2 ), Ok( PlayerAction::PlayPause ) );
        assert_eq!( PlayerAction::try_from( 7 ), Err( 7 ) );
        assert_eq!( UrlListAction::try_from( -1 ), Err( -1 ) );
    }


    #[test]
    fn test_sentinel_conversion() {
        assert_eq!( from_sentinel( -1 ), None );
        assert_eq!( from_sentinel( -42 ), None );
        assert_eq!( from_sentinel( 0 ), Some( 0 ) );
        assert_eq!( to_sentinel( None ), -1 );
        assert_eq!( to_sentinel( Some( 75 ) ), 75 );
    }


    #[test]
    fn test_builder_clamps_to_wire_range() {
        let options = Options::builder().seek_to( Some( u32::MAX ) ).build();
        assert_eq!( options.seek_to(), Some( MAX_NUMERIC_VALUE ) );
    }


    #[test]
    fn test_classify_remote_kept_verbatim() {
        let url = MediaUrl::classify( Path::new( "http://example.com/x" ) ).unwrap();
        assert_eq!( url.as_str(), "http://example.com/x" );
        assert!( !url.is_local_file() );
        assert_eq!( url.to_file_path(), None );
    }


    #[test]
    fn test_classify_relative_path_becomes_absolute() {
        let url = MediaUrl::classify( Path::new( "song.mp3" ) ).unwrap();
        let expected = std::env::current_dir().unwrap().join( "song.mp3" );

        assert!( url.is_local_file() );
        assert_eq!( url.to_file_path(), Some( expected ) );
    }


    #[test]
    fn test_classify_empty_path_fails() {
        assert!( MediaUrl::classify( Path::new( "" ) ).is_err() );
    }


    #[test]
    fn test_display_summary() {
        let options = Options::builder()
            .player_action( PlayerAction::Play )
            .volume_modifier( VOLUME_STEP )
            .url_list_action( UrlListAction::Load )
            .url( MediaUrl::remote( "http://example.com/x" ) )
            .build();

        let text = options.to_string();
        assert!( text.contains( "player action: play" ) );
        assert!( text.contains( "volume change: +4%" ) );
        assert!( text.contains( "urls (load):" ) );
        assert!( text.contains( "  http://example.com/x" ) );
        assert_eq!( Options::default().to_string(), "no command-line actions\n" );
    }
}
