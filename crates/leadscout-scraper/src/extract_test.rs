use super::*;

fn texts(html: &str) -> Vec<String> {
    extract_candidates(html, Region::Brazil)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

#[test]
fn tel_link_is_taken_verbatim() {
    let html = r#"<html><body><a href="tel:+55 41 3322-1100">Ligue</a></body></html>"#;
    assert_eq!(texts(html), vec!["+55 41 3322-1100"]);
}

#[test]
fn tel_link_is_percent_decoded_and_case_insensitive() {
    let html = r#"<a href="TEL:%2B55%2041%203322-1100">Ligue</a>"#;
    assert_eq!(texts(html), vec!["+55 41 3322-1100"]);
}

#[test]
fn wa_me_link_without_country_gets_prefix() {
    let html = r#"<a href="https://wa.me/41998887766">WhatsApp</a>"#;
    assert_eq!(texts(html), vec!["+5541998887766"]);
}

#[test]
fn wa_me_link_with_country_keeps_it() {
    let html = r#"<a href="https://wa.me/5541998887766?text=Ola">WhatsApp</a>"#;
    assert_eq!(texts(html), vec!["+5541998887766"]);
}

#[test]
fn api_send_link_phone_parameter() {
    let html =
        r#"<a href="https://api.whatsapp.com/send?text=oi&amp;phone=5511988887777">Chat</a>"#;
    assert_eq!(texts(html), vec!["+5511988887777"]);
}

#[test]
fn web_and_app_scheme_links() {
    let html = r#"
        <a href="https://web.whatsapp.com/send?phone=11988887777">Web</a>
        <a href="whatsapp://send?phone=%2B5511977776666">App</a>
    "#;
    assert_eq!(texts(html), vec!["+5511988887777", "+5511977776666"]);
}

#[test]
fn free_text_matches_formatted_numbers() {
    let html = "<html><body><p>Atendimento: (41) 99888-7766 ou 41 3322.1100</p></body></html>";
    assert_eq!(texts(html), vec!["(41) 99888-7766", "41 3322.1100"]);
}

#[test]
fn free_text_ignores_scripts_and_styles() {
    let html = r#"
        <html><body>
          <script>var tracking = "(11) 3344-5566";</script>
          <style>.x{content:"(11) 3344-5577"}</style>
          <noscript>(11) 3344-5588</noscript>
          <p>Sem telefone aqui</p>
        </body></html>
    "#;
    assert!(texts(html).is_empty());
}

#[test]
fn strategies_are_concatenated_without_dedup() {
    let html = r#"<body><a href="tel:+554133221100">+55 41 3322-1100</a></body>"#;
    let found = texts(html);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0], "+554133221100");
    assert_eq!(found[1], "+55 41 3322-1100");
}

#[test]
fn malformed_markup_yields_empty() {
    assert!(texts("<<<not html at all").is_empty());
    assert!(texts("").is_empty());
}

#[test]
fn unrelated_links_are_ignored() {
    let html = r#"<a href="mailto:contato@example.com">x</a><a href="/sobre">y</a>"#;
    assert!(texts(html).is_empty());
}

#[test]
fn title_is_collapsed_and_capped() {
    let html = "<html><head><title>\n  Clinica   Sorriso \n</title></head></html>";
    assert_eq!(page_title(html).as_deref(), Some("Clinica Sorriso"));

    let long = format!("<title>{}</title>", "á".repeat(300));
    let title = page_title(&long).unwrap();
    assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
}

#[test]
fn missing_or_blank_title_is_none() {
    assert_eq!(page_title("<html><body>x</body></html>"), None);
    assert_eq!(page_title("<title>   </title>"), None);
}
