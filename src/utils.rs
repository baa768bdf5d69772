pub mod constants {
    pub const WATCH_URL: &str = "https://www.youtube.com/watch";
    pub const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3/";
    /// One Data API page - playlist and search calls never paginate past this.
    pub const MAX_RESULTS: u32 = 50;
    pub const VIDEO_EXT: &str = "mp4";
    pub const AUDIO_EXT: &str = "mp3";
}
