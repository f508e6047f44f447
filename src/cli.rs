use clap::Parser;
use std::path::PathBuf;

use crate::location::Coordinates;

#[derive(Parser, Debug)]
#[command(
    name = "casafinder",
    version,
    about = "Describe the house you imagine and turn it into a search query"
)]
pub struct Cli {
    /// Directory for the session log
    #[arg(long, env = "CASAFINDER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write each confirmed query as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Reference image to start with
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Initial description text
    #[arg(long)]
    pub description: Option<String>,

    /// Initial map centre as "lat,lng"
    #[arg(long, default_value = "9.9281,-84.0907")]
    pub center: Coordinates,

    /// Initial map zoom (1-18)
    #[arg(long, default_value_t = 12)]
    pub zoom: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_center_on_san_jose() {
        let cli = Cli::try_parse_from(["casafinder"]).unwrap();
        assert_eq!(cli.center, Coordinates::new(9.9281, -84.0907));
        assert_eq!(cli.zoom, 12);
        assert!(cli.output.is_none());
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "casafinder",
            "--output",
            "/tmp/q.json",
            "--image",
            "house.jpg",
            "--description",
            "moderno",
            "--center",
            "10.5,-85",
            "--zoom",
            "8",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("/tmp/q.json")));
        assert_eq!(cli.image, Some(PathBuf::from("house.jpg")));
        assert_eq!(cli.description.as_deref(), Some("moderno"));
        assert_eq!(cli.center, Coordinates::new(10.5, -85.0));
        assert_eq!(cli.zoom, 8);
    }

    #[test]
    fn rejects_malformed_center() {
        assert!(Cli::try_parse_from(["casafinder", "--center", "here"]).is_err());
    }
}
