//! Help text for the command line.
//!
//! The layout is fixed; only the label strings change between languages.
//! Labels come from [`HelpLabels`], which defaults to English and can be
//! deserialized from a translation file where every missing entry keeps
//! its English default.

use serde::Deserialize;


/// Label strings substituted into the help template, in slot order.
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
#[serde( default )]
pub struct HelpLabels {
    pub usage: String,
    pub options: String,
    pub urls: String,
    pub player_options: String,
    pub play: String,
    pub play_pause: String,
    pub pause: String,
    pub stop: String,
    pub previous: String,
    pub next: String,
    pub volume: String,
    pub volume_up: String,
    pub volume_down: String,
    pub seek_to: String,
    pub playlist_options: String,
    pub append: String,
    pub load: String,
    pub play_track: String,
    pub other_options: String,
    pub show_osd: String,
}


impl Default for HelpLabels {
    fn default() -> Self {
        Self {
            usage: "Usage".into(),
            options: "options".into(),
            urls: "URL(s)".into(),
            player_options: "Player options".into(),
            play: "Start the playlist currently playing".into(),
            play_pause: "Play if stopped, pause if playing".into(),
            pause: "Pause playback".into(),
            stop: "Stop playback".into(),
            previous: "Skip backwards in playlist".into(),
            next: "Skip forwards in playlist".into(),
            volume: "Set the volume to <value> percent".into(),
            volume_up: "Increase the volume by 4%".into(),
            volume_down: "Decrease the volume by 4%".into(),
            seek_to: "Seek the currently playing track".into(),
            playlist_options: "Playlist options".into(),
            append: "Append files/URLs to the playlist".into(),
            load: "Loads files/URLs, replacing current playlist".into(),
            play_track: "Play the <n>th track in the playlist".into(),
            other_options: "Other options".into(),
            show_osd: "Display the on-screen-display".into(),
        }
    }
}


impl HelpLabels {
    /// Renders the full help text.
    pub fn render( &self ) -> String {
        format!(
            "{usage}: lyra [{options}] [{urls}]\n\
             \n\
             {player_options}:\n  \
             -p, --play                {play}\n  \
             -t, --play-pause          {play_pause}\n  \
             -u, --pause               {pause}\n  \
             -s, --stop                {stop}\n  \
             -r, --previous            {previous}\n  \
             -f, --next                {next}\n  \
             -v, --volume <value>      {volume}\n  \
             --volume-up               {volume_up}\n  \
             --volume-down             {volume_down}\n  \
             --seek-to <seconds>       {seek_to}\n\
             \n\
             {playlist_options}:\n  \
             -a, --append              {append}\n  \
             -l, --load                {load}\n  \
             -k, --play-track <n>      {play_track}\n\
             \n\
             {other_options}:\n  \
             -o, --show-osd            {show_osd}\n",
            usage = self.usage,
            options = self.options,
            urls = self.urls,
            player_options = self.player_options,
            play = self.play,
            play_pause = self.play_pause,
            pause = self.pause,
            stop = self.stop,
            previous = self.previous,
            next = self.next,
            volume = self.volume,
            volume_up = self.volume_up,
            volume_down = self.volume_down,
            seek_to = self.seek_to,
            playlist_options = self.playlist_options,
            append = self.append,
            load = self.load,
            play_track = self.play_track,
            other_options = self.other_options,
            show_osd = self.show_osd,
        )
    }
}


#[cfg( test )]
mod tests {
    use super::*;


    #[test]
    fn test_render_default_sections() {
        let text = HelpLabels::default().render();

        assert!( text.starts_with( "Usage: lyra [options] [URL(s)]\n\nPlayer options:\n" ) );
        assert!( text.contains( "\n\nPlaylist options:\n" ) );
        assert!( text.contains( "\n\nOther options:\n" ) );
        assert!( text.ends_with( "  -o, --show-osd            Display the on-screen-display\n" ) );
    }


    #[test]
    fn test_render_lists_every_flag() {
        let text = HelpLabels::default().render();
        let flags = [
            "--play ", "--play-pause", "--pause", "--stop", "--previous", "--next",
            "--volume <value>", "--volume-up", "--volume-down", "--seek-to <seconds>",
            "--append", "--load", "--play-track <n>", "--show-osd",
        ];

        for flag in flags {
            assert!( text.contains( flag ), "missing {}", flag );
        }
    }


    #[test]
    fn test_render_flag_column_is_aligned() {
        let text = HelpLabels::default().render();
        let flag_lines: Vec<&str> = text.lines()
            .filter( |line| line.starts_with( "  -" ) )
            .collect();

        assert_eq!( flag_lines.len(), 14 );
        for line in flag_lines {
            assert_eq!( line.as_bytes()[ 27 ], b' ', "{}", line );
            assert_ne!( line.as_bytes()[ 28 ], b' ', "{}", line );
        }
    }


    #[test]
    fn test_partial_translation_keeps_defaults() {
        let labels: HelpLabels = serde_json::from_str(
            r#"{ "usage": "Utilisation", "stop": "Arrêter la lecture" }"#
        ).unwrap();

        assert_eq!( labels.usage, "Utilisation" );
        assert_eq!( labels.pause, HelpLabels::default().pause );

        let text = labels.render();
        assert!( text.starts_with( "Utilisation: lyra" ) );
        assert!( text.contains( "-s, --stop                Arrêter la lecture" ) );
    }
}
