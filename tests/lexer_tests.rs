use html_compressor::{ErrorKind, Token, TokenKind, generate, tokenize};

fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
    tokens.iter().map(|t| t.kind).collect()
}

#[test]
fn test_template_tokens() {
    let tokens = tokenize("<p>{% if user %}{{ user.name }}{% endif %}</p>").unwrap();
    assert_eq!(
        kinds(&tokens),
        vec![
            TokenKind::Data,
            TokenKind::BlockBegin,
            TokenKind::Name,
            TokenKind::Name,
            TokenKind::BlockEnd,
            TokenKind::VariableBegin,
            TokenKind::Name,
            TokenKind::Operator,
            TokenKind::Name,
            TokenKind::VariableEnd,
            TokenKind::BlockBegin,
            TokenKind::Name,
            TokenKind::BlockEnd,
            TokenKind::Data,
        ]
    );
}

#[test]
fn test_token_serializes() {
    let tokens = tokenize("{% strip %}").unwrap();
    let json = serde_json::to_value(&tokens[0]).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"kind": "block_begin", "value": "{%", "lineno": 1, "raw": "{% strip %}"})
    );
    let json = serde_json::to_value(&tokens[1]).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "name", "value": "strip", "lineno": 1}));
}

#[test]
fn test_multiline_directive_lines() {
    let tokens = tokenize("{% set x = [\n  1,\n  2\n] %}\n<p>").unwrap();
    let last = tokens.last().unwrap();
    assert_eq!(last.kind, TokenKind::Data);
    assert_eq!(last.lineno, 4);
    let close = tokens.iter().find(|t| t.kind == TokenKind::BlockEnd).unwrap();
    assert_eq!(close.lineno, 4);
}

#[test]
fn test_unterminated_render() {
    let source = "<p>\n  {{ user.name\n</p>\n";
    let err = tokenize(source).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedDirective);
    let rendered = err.render(source, "page.html");
    assert!(rendered.contains("page.html:2"));
    assert!(rendered.contains("never closed with '}}'"));
}

#[test]
fn test_emit_keeps_directive_source() {
    let sources = [
        "{%for  a in b%}{{a|e}}{%endfor%}",
        "{{ 1e5 }} {{ 0x1F }} {{ 0o17 }} {{ 1_000.5e+3 }}",
        "{% set x = [\n  1,\n  2\n] -%}\n{{x}}",
        "{% raw %}{{#each items}}{{ 'oops }}{{/each}}{% endraw %}",
    ];
    for source in sources {
        let tokens = tokenize(source).unwrap();
        assert_eq!(generate::emit(&tokens), source.replace("-%}\n", "-%}"));
    }
}

#[test]
fn test_raw_block_tokens() {
    let tokens = tokenize("{% raw %}{{ 'oops }}{% endraw %}").unwrap();
    assert_eq!(tokens[3], Token::data("{{ 'oops }}", 1));
    assert!(tokens[5].test_name("endraw"));
}
