use logos::Logos;

/// The leading token of a trimmed source line.
#[derive(Debug, Clone, Copy, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Keyword {
    #[token("syntax")]
    Syntax,
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("option")]
    Option,
    #[token("service")]
    Service,
    #[token("rpc")]
    Rpc,
    #[token("message")]
    Message,
    #[regex(r"[^ \t\r\n\f]+")]
    Other,
}

/// The bucket a line was last routed to.
///
/// `Rpc` lines are stored with their service, but option lines following an rpc belong to the
/// rpc body rather than to the file-level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Syntax,
    Package,
    Import,
    Option,
    Service,
    Rpc,
    Message,
}

/// Source lines grouped by the top-level construct they belong to.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Sections<'a> {
    pub syntax: Vec<&'a str>,
    pub package: Vec<&'a str>,
    pub import: Vec<&'a str>,
    pub option: Vec<&'a str>,
    pub service: Vec<&'a str>,
    pub message: Vec<&'a str>,
}

impl<'a> Sections<'a> {
    /// Splits `source` into trimmed, non-empty lines and routes each to a section by its first
    /// token. Lines starting with anything other than a keyword continue the previous section,
    /// and are dropped if no section has started yet.
    pub fn classify(source: &'a str) -> Self {
        let mut sections = Sections::default();
        let mut last = None;

        for line in source.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let section = match leading_keyword(line) {
                Some(Keyword::Syntax) => Some(Section::Syntax),
                Some(Keyword::Package) => Some(Section::Package),
                Some(Keyword::Import) => Some(Section::Import),
                Some(Keyword::Option) if last == Some(Section::Rpc) => Some(Section::Rpc),
                Some(Keyword::Option) => Some(Section::Option),
                Some(Keyword::Service) => Some(Section::Service),
                Some(Keyword::Rpc) => Some(Section::Rpc),
                Some(Keyword::Message) => Some(Section::Message),
                Some(Keyword::Other) | None => last,
            };

            if let Some(section) = section {
                sections.push(section, line);
                last = Some(section);
            }
        }

        sections
    }

    fn push(&mut self, section: Section, line: &'a str) {
        let lines = match section {
            Section::Syntax => &mut self.syntax,
            Section::Package => &mut self.package,
            Section::Import => &mut self.import,
            Section::Option => &mut self.option,
            Section::Service | Section::Rpc => &mut self.service,
            Section::Message => &mut self.message,
        };
        lines.push(line);
    }
}

fn leading_keyword(line: &str) -> Option<Keyword> {
    Keyword::lexer(line).next().and_then(Result::ok)
}

#[test]
fn leading_keyword_must_be_whole_token() {
    assert_eq!(leading_keyword("syntax = \"proto3\";"), Some(Keyword::Syntax));
    assert_eq!(leading_keyword("syntax=\"proto3\";"), Some(Keyword::Other));
    assert_eq!(leading_keyword("messages {"), Some(Keyword::Other));
    assert_eq!(leading_keyword("rpc\tFoo(A) returns (B);"), Some(Keyword::Rpc));
    assert_eq!(leading_keyword("}"), Some(Keyword::Other));
    assert_eq!(leading_keyword(""), None);
}

#[test]
fn classify_routes_lines_by_keyword() {
    let source = "
        syntax = \"proto3\";

        package foo;
        import \"a.proto\";
        option go_package = \"main\";
        service Foo {
            rpc Bar(A) returns (B) {
                option (http) = {
                    post: \"/v1/bar\";
                };
            };
        }
        message A {
            string a = 1;
        }
    ";

    assert_eq!(
        Sections::classify(source),
        Sections {
            syntax: vec!["syntax = \"proto3\";"],
            package: vec!["package foo;"],
            import: vec!["import \"a.proto\";"],
            option: vec!["option go_package = \"main\";"],
            service: vec![
                "service Foo {",
                "rpc Bar(A) returns (B) {",
                "option (http) = {",
                "post: \"/v1/bar\";",
                "};",
                "};",
                "}",
            ],
            message: vec!["message A {", "string a = 1;", "}"],
        }
    );
}

#[test]
fn classify_drops_lines_before_first_keyword() {
    let sections = Sections::classify("foo bar\n}\nsyntax = 'proto3';\n");
    assert_eq!(sections.syntax, vec!["syntax = 'proto3';"]);
    assert!(sections.package.is_empty());
    assert!(sections.message.is_empty());
}

#[test]
fn classify_continues_previous_section() {
    let sections = Sections::classify("option a = 'x';\n  more\nimport\n'b.proto';");
    assert_eq!(sections.option, vec!["option a = 'x';", "more"]);
    assert_eq!(sections.import, vec!["import", "'b.proto';"]);
}

#[test]
fn classify_keeps_options_after_rpc_in_service() {
    let sections = Sections::classify(
        "service S {\n  rpc M(A) returns (B);\n}\noption go_package = \"x\";\nmessage A {\n}",
    );
    assert_eq!(
        sections.service,
        vec![
            "service S {",
            "rpc M(A) returns (B);",
            "}",
            "option go_package = \"x\";",
        ]
    );
    assert!(sections.option.is_empty());
    assert_eq!(sections.message, vec!["message A {", "}"]);

    let sections =
        Sections::classify("service S { rpc M(A) returns (B); }\noption go_package = \"x\";");
    assert_eq!(sections.service, vec!["service S { rpc M(A) returns (B); }"]);
    assert_eq!(sections.option, vec!["option go_package = \"x\";"]);
}
