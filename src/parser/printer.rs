use terminal_size::{terminal_size, Width};

use crate::model::{Descriptor, Nargs, ParsingMode};
use crate::parser::interface::UserInterface;
use crate::text::Messages;

// Keep enough room to fit a few words per description line.
const MINIMUM_DESCRIPTION_WIDTH: usize = 17;
const FALLBACK_WIDTH: usize = 100;

// Renders usage help from the descriptor metadata, read-only.
pub(crate) struct Printer {
    about: Option<String>,
    descriptors: Vec<Descriptor>,
    mode: ParsingMode,
    terminal_width: Option<usize>,
}

impl Printer {
    pub(crate) fn terminal(
        about: Option<String>,
        descriptors: Vec<Descriptor>,
        mode: ParsingMode,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self {
            about,
            descriptors,
            mode,
            terminal_width,
        }
    }

    #[cfg(test)]
    pub(crate) fn fixed(
        about: Option<String>,
        descriptors: Vec<Descriptor>,
        mode: ParsingMode,
        width: usize,
    ) -> Self {
        Self {
            about,
            descriptors,
            mode,
            terminal_width: Some(width),
        }
    }

    pub(crate) fn print_help(
        &self,
        program: &str,
        messages: &dyn Messages,
        user_interface: &dyn UserInterface,
    ) {
        let width = self.terminal_width.unwrap_or(FALLBACK_WIDTH);
        let visible: Vec<&Descriptor> = self.descriptors.iter().filter(|d| !d.hidden).collect();
        let options: Vec<&Descriptor> = visible
            .iter()
            .copied()
            .filter(|d| !d.positional)
            .collect();
        let mut positionals: Vec<&Descriptor> = visible
            .iter()
            .copied()
            .filter(|d| d.positional)
            .collect();
        positionals.sort_by_key(|d| d.position);

        let mut usage = format!("{heading}: {program}", heading = messages.usage_heading());

        for descriptor in &options {
            usage.push(' ');
            usage.push_str(&bracketed(
                descriptor.required,
                &self.usage_option(descriptor),
            ));
        }

        for descriptor in &positionals {
            let mut item = descriptor.name.clone();

            if unbounded(descriptor) {
                item.push_str(" ...");
            }

            usage.push(' ');
            usage.push_str(&bracketed(descriptor.required, &item));
        }

        for line in wrap(&usage, width) {
            user_interface.print(line);
        }

        if let Some(about) = &self.about {
            user_interface.print(String::default());

            for line in wrap(about, width) {
                user_interface.print(line);
            }
        }

        if !positionals.is_empty() {
            user_interface.print(String::default());
            user_interface.print(format!("{heading}:", heading = messages.arguments_heading()));
            let entries = positionals
                .iter()
                .map(|d| (d.name.clone(), describe(d)))
                .collect();
            render_entries(entries, width, user_interface);
        }

        let general: Vec<&Descriptor> = options
            .iter()
            .copied()
            .filter(|d| d.category.is_none())
            .collect();

        if !general.is_empty() {
            user_interface.print(String::default());
            user_interface.print(format!("{heading}:", heading = messages.options_heading()));
            let entries = general
                .iter()
                .map(|d| (self.entry_name(d), describe(d)))
                .collect();
            render_entries(entries, width, user_interface);
        }

        let mut categories: Vec<&str> = options
            .iter()
            .filter_map(|d| d.category.as_deref())
            .collect();
        categories.sort_unstable();
        categories.dedup();

        for category in categories {
            user_interface.print(String::default());
            user_interface.print(format!("{category}:"));
            let entries = options
                .iter()
                .copied()
                .filter(|d| d.category.as_deref() == Some(category))
                .map(|d| (self.entry_name(d), describe(d)))
                .collect();
            render_entries(entries, width, user_interface);
        }
    }

    // Usage favours the short name; the listing shows both.
    fn usage_option(&self, descriptor: &Descriptor) -> String {
        let name = match (self.mode, descriptor.short) {
            (ParsingMode::LongShort, Some(short)) => format!("-{short}"),
            _ => descriptor.display_name(self.mode),
        };

        if descriptor.is_switch() {
            name
        } else {
            let mut item = format!("{name} {v}", v = descriptor.value_description);

            if unbounded(descriptor) {
                item.push_str(" ...");
            }

            item
        }
    }

    fn entry_name(&self, descriptor: &Descriptor) -> String {
        let mut name = match self.mode {
            ParsingMode::SingleDash => descriptor.display_name(self.mode),
            ParsingMode::LongShort => match (descriptor.long_suppressed, descriptor.short) {
                (true, Some(short)) => format!("-{short}"),
                (false, Some(short)) => format!("-{short}, --{n}", n = descriptor.name),
                _ => format!("--{n}", n = descriptor.name),
            },
        };

        if !descriptor.is_switch() {
            name.push(' ');
            name.push_str(&descriptor.value_description);
        }

        name
    }
}

fn describe(descriptor: &Descriptor) -> String {
    let mut description = descriptor.help.clone().unwrap_or_default();

    if let Some(default) = &descriptor.default_text {
        if !description.is_empty() {
            description.push(' ');
        }

        description.push_str(&format!("[default: {default}]"));
    }

    description
}

fn unbounded(descriptor: &Descriptor) -> bool {
    matches!(descriptor.nargs, Nargs::Any | Nargs::AtLeastOne)
}

fn bracketed(required: bool, item: &str) -> String {
    if required {
        item.to_string()
    } else {
        format!("[{item}]")
    }
}

fn render_entries(
    entries: Vec<(String, String)>,
    width: usize,
    user_interface: &dyn UserInterface,
) {
    let left_width = entries
        .iter()
        .map(|(left, _)| left.len())
        .max()
        .unwrap_or(0);
    let description_width = std::cmp::max(
        MINIMUM_DESCRIPTION_WIDTH,
        width.saturating_sub(left_width + 4),
    );

    for (left, description) in entries {
        if description.is_empty() {
            user_interface.print(format!(" {left}"));
            continue;
        }

        for (i, part) in wrap(&description, description_width).into_iter().enumerate() {
            if i == 0 {
                user_interface.print(format!(" {left:<left_width$}   {part}"));
            } else {
                user_interface.print(format!(" {:left_width$}   {part}", ""));
            }
        }
    }
}

fn wrap(paragraph: &str, width: usize) -> Vec<String> {
    let width = std::cmp::max(width, 1);
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            push_word(&mut lines, &mut current, word, width);
        } else if current.len() + word.len() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            push_word(&mut lines, &mut current, word, width);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// An overlong word is chunked across lines.
fn push_word(lines: &mut Vec<String>, current: &mut String, word: &str, width: usize) {
    let mut word = word;

    while word.len() > width {
        let (head, tail) = word.split_at(width);
        lines.push(head.to_string());
        word = tail;
    }

    current.push_str(word);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Parameter, Scalar, Trigger};
    use crate::model::CancelMode;
    use crate::parser::interface::util::InMemoryInterface;
    use crate::text::DefaultMessages;

    fn help_descriptor() -> Descriptor {
        Parameter::option(Trigger::new(), "help", Some('h'))
            .cancel(CancelMode::AbortWithHelp)
            .help("Show this help message and exit.")
            .consume()
            .0
    }

    #[test]
    fn print_help_minimal() {
        let printer = Printer::fixed(
            None,
            vec![help_descriptor()],
            ParsingMode::LongShort,
            80,
        );
        let interface = InMemoryInterface::default();

        printer.print_help("program", &DefaultMessages, &interface);

        assert_eq!(
            interface.consume_message(),
            r#"usage: program [-h]

options:
 -h, --help   Show this help message and exit."#
        );
    }

    #[test]
    fn print_help_wraps_description() {
        let printer = Printer::fixed(
            None,
            vec![help_descriptor()],
            ParsingMode::LongShort,
            31,
        );
        let interface = InMemoryInterface::default();

        printer.print_help("program", &DefaultMessages, &interface);

        assert_eq!(
            interface.consume_message(),
            r#"usage: program [-h]

options:
 -h, --help   Show this help
              message and exit."#
        );
    }

    #[test]
    fn print_help_sections() {
        let mut size: u64 = 0;
        let mut threads: u32 = 0;
        let mut source = String::default();
        let descriptors = vec![
            help_descriptor(),
            Parameter::option(Scalar::new(&mut size), "size", None)
                .help("The chunk size.")
                .default_text("4096")
                .consume()
                .0,
            Parameter::option(Scalar::new(&mut threads), "threads", None)
                .help("Worker threads.")
                .category("tuning")
                .consume()
                .0,
            {
                let mut descriptor = Parameter::argument(Scalar::new(&mut source), "source")
                    .help("The source path.")
                    .required()
                    .consume()
                    .0;
                descriptor.position = Some(0);
                descriptor
            },
        ];
        let printer = Printer::fixed(
            Some("Copy things around.".to_string()),
            descriptors,
            ParsingMode::LongShort,
            80,
        );
        let interface = InMemoryInterface::default();

        printer.print_help("program", &DefaultMessages, &interface);

        assert_eq!(
            interface.consume_message(),
            r#"usage: program [-h] [--size u64] [--threads u32] source

Copy things around.

arguments:
 source   The source path.

options:
 -h, --help   Show this help message and exit.
 --size u64   The chunk size. [default: 4096]

tuning:
 --threads u32   Worker threads."#
        );
    }

    #[test]
    fn print_help_hidden_excluded() {
        let mut secret: u32 = 0;
        let descriptors = vec![
            help_descriptor(),
            Parameter::option(Scalar::new(&mut secret), "secret", None)
                .hidden()
                .consume()
                .0,
        ];
        let printer = Printer::fixed(None, descriptors, ParsingMode::LongShort, 80);
        let interface = InMemoryInterface::default();

        printer.print_help("program", &DefaultMessages, &interface);

        let message = interface.consume_message();
        assert!(!message.contains("secret"));
    }

    #[test]
    fn print_help_single_dash_mode() {
        let mut size: u64 = 0;
        let descriptors = vec![
            Parameter::option(Trigger::new(), "help", Some('h'))
                .cancel(CancelMode::AbortWithHelp)
                .help("Show this help message and exit.")
                .consume()
                .0,
            Parameter::option(Scalar::new(&mut size), "size", None)
                .help("The chunk size.")
                .consume()
                .0,
        ];
        let printer = Printer::fixed(None, descriptors, ParsingMode::SingleDash, 80);
        let interface = InMemoryInterface::default();

        printer.print_help("program", &DefaultMessages, &interface);

        assert_eq!(
            interface.consume_message(),
            r#"usage: program [-help] [-size u64]

options:
 -help       Show this help message and exit.
 -size u64   The chunk size."#
        );
    }
}
