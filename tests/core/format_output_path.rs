//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod passing {
    use wikitrans::core::format_output_path;

    #[test]
    fn as_is() {
        let final_destination =
            format_output_path("/home/username/wiki/Crystals.html", Some(""));

        assert_eq!(final_destination, "/home/username/wiki/Crystals.html");
    }

    #[test]
    fn substitute_title() {
        let final_destination =
            format_output_path("/home/username/wiki/%title%.html", Some("Gold Boxes"));

        assert_eq!(final_destination, "/home/username/wiki/Gold Boxes.html");
    }

    #[test]
    fn substitute_title_multi() {
        let final_destination = format_output_path(
            "/home/username/wiki/%title%/%title%.html",
            Some("Gold Boxes"),
        );

        assert_eq!(
            final_destination,
            "/home/username/wiki/Gold Boxes/Gold Boxes.html"
        );
    }

    #[test]
    fn sanitize() {
        let final_destination = format_output_path(
            r#"/home/username/wiki/<>:"|?/%title%.html"#,
            Some(r#"/\<>:"|?"#),
        );

        assert_eq!(
            final_destination,
            r#"/home/username/wiki/<>:"|?/__[] - -.html"#
        );
    }

    #[test]
    fn level_up() {
        let final_destination = format_output_path("../%title%.html", Some(".Title"));

        assert_eq!(final_destination, r#"../Title.html"#);
    }

    #[test]
    fn timestamp() {
        let final_destination = format_output_path("%timestamp%.html", None);

        assert!(final_destination.ends_with("Z.html"));
        assert!(!final_destination.contains(':'));
        assert!(!final_destination.contains("%timestamp%"));
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use wikitrans::core::format_output_path;

    #[test]
    fn empty_title_does_not_produce_hidden_file() {
        let final_destination = format_output_path("out/%title%.html", Some("..."));

        assert_eq!(final_destination, "out/untitled.html");
    }

    #[test]
    fn missing_title() {
        let final_destination = format_output_path("%title%.html", None);

        assert_eq!(final_destination, "untitled.html");
    }
}
