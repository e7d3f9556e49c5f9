use crate::CLAP_STYLING;
use clap::{arg, command};

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("bandmap")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("bandmap")
        .about("Maps bands to each other through the musicians they share, using MusicBrainz")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" ... "Increase log verbosity (-v info, -vv debug)")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl outward from a seed band, following the bands its members also \
                play in, and write the band network as JSON.",
                )
                .arg(
                    arg!(<SEED_ID>)
                        .required(true)
                        .help("MusicBrainz artist id of the seed band, or its musicbrainz.org URL"),
                )
                .arg(
                    arg!(-d --"depth" <DEPTH>)
                        .required(false)
                        .help("How many hops from the seed band to expand (default: 2)")
                        .value_parser(clap::value_parser!(usize))
                        .conflicts_with("one-hop"),
                )
                .arg(
                    arg!(--"one-hop")
                        .required(false)
                        .help("Only look up the seed band's own members and supporting musicians")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("depth"),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Pause after each person lookup, in milliseconds (default: 1100)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(-c --"config" <PATH>)
                        .required(false)
                        .help("Path to a TOML config file"),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent sent to MusicBrainz; include a way to contact you"),
                )
                .arg(
                    arg!(--"base-url" <URL>)
                        .required(false)
                        .help(
                            "MusicBrainz web service root \
                        (default: https://musicbrainz.org/ws/2/)",
                        ),
                )
                .arg(
                    arg!(--"offline" <PATH>)
                        .required(false)
                        .help(
                            "Replay a JSON array of saved artist records \
                        instead of querying MusicBrainz",
                        ),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help(
                            "Where to write the band network \
                        (default: bands_network_extended.json, \
                        or bands_network.json with --one-hop)",
                        ),
                )
                .arg(
                    arg!(-r --"report" <PATH>)
                        .required(false)
                        .help("Also save a summary report to this file"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            command!("report")
                .about("Summarise a band network written by `crawl`")
                .arg(
                    arg!(<PATH>)
                        .required(true)
                        .help("Band network JSON file"),
                )
                .arg(
                    arg!(-b --"band" <ID>)
                        .required(false)
                        .help("List the neighbours of one band instead of the full summary"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definition_is_valid() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_crawl_defaults() {
        let matches = command_argument_builder()
            .try_get_matches_from(["bandmap", "crawl", "a5585acd-9b65-49a7-a63b-3cc4ee18846e"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "crawl");
        assert_eq!(
            sub.get_one::<String>("SEED_ID").map(String::as_str),
            Some("a5585acd-9b65-49a7-a63b-3cc4ee18846e")
        );
        assert!(!sub.get_flag("one-hop"));
        assert!(sub.get_one::<usize>("depth").is_none());
        assert_eq!(sub.get_one::<String>("format").map(String::as_str), Some("text"));
    }

    #[test]
    fn test_depth_conflicts_with_one_hop() {
        let result = command_argument_builder().try_get_matches_from([
            "bandmap", "crawl", "seed", "--depth", "3", "--one-hop",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbose_counts() {
        let matches = command_argument_builder()
            .try_get_matches_from(["bandmap", "-vv", "report", "out.json"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
    }

    #[test]
    fn test_rejects_unknown_format() {
        let result = command_argument_builder()
            .try_get_matches_from(["bandmap", "report", "out.json", "--format", "csv"]);
        assert!(result.is_err());
    }
}
