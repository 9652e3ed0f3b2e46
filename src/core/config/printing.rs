use crate::core::config::data::{path_display, Config};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        print_entry("explain-url", self.explain_url.as_deref());
        print_entry("video-url", self.video_url.as_deref());
        print_entry(
            "default-subject",
            self.default_subject.map(|subject| subject.as_str()),
        );
        let video_dir = self.video_dir.as_ref().map(path_display);
        print_entry("video-dir", video_dir.as_deref());
    }
}

fn print_entry(key: &str, value: Option<&str>) {
    match value {
        Some(value) => println!("  {key}: {value}"),
        None => println!("  {key}: (unset)"),
    }
}
