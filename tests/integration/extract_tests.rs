//! Integration tests for content extraction
//!
//! These tests run the extractor over saved pages on disk, through the
//! batch pipeline and into the final output file.

use canton_crawler::extract::process_file;
use canton_crawler::output::{discover_files, extract_batch, write_results, OutputFormat};
use canton_crawler::{extract_content, extract_plain_text, ExtractionResult, Fallback};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE_PAGE: &str = r#"<html>
<head><title>Club</title><script>var tracking = 1;</script></head>
<body>
<nav>Inicio | Novedades | Contacto</nav>
<table class="contenido"><tr><td>
<div class="novedadespop_titulo"> Asamblea anual </div>
<table><tr><td class="novedadespop_fecha">12/03/2024</td></tr></table>
<table role="presentation"><tr><td>Primer p&aacute;rrafo<br>segunda l&iacute;nea</td></tr></table>
<script>ignored()</script>
<table role="presentation"><tr><td><p>Cierre</p></td></tr></table>
</td></tr></table>
<footer>Todos los derechos reservados</footer>
</body>
</html>"#;

fn page(title: Option<&str>, date: Option<&str>, body: &str) -> String {
    let title = title
        .map(|t| format!(r#"<div class="novedadespop_titulo">{}</div>"#, t))
        .unwrap_or_default();
    let date = date
        .map(|d| format!(r#"<table><tr><td class="novedadespop_fecha">{}</td></tr></table>"#, d))
        .unwrap_or_default();
    format!(
        r#"<html><body>{date}<table class="contenido"><tr><td>{title}<table role="presentation"><tr><td>{body}</td></tr></table></td></tr></table></body></html>"#
    )
}

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn test_sample_page_extraction() {
    let result = extract_content(SAMPLE_PAGE);

    assert_eq!(result.fallback, Fallback::Contenido);
    assert_eq!(result.title.as_deref(), Some("Asamblea anual"));
    assert_eq!(result.date.as_deref(), Some("12/03/2024"));
    assert_eq!(result.text, "Primer párrafo\nsegunda línea\n\nCierre");
}

#[test]
fn test_extraction_is_deterministic() {
    let first = extract_content(SAMPLE_PAGE);
    let second = extract_content(SAMPLE_PAGE);
    assert_eq!(first, second);
}

#[test]
fn test_contenido_wins_over_larger_blocks() {
    let html = r#"<html><body>
        <div id="news-body">noticia</div>
        <div>Un bloque mucho mas largo que el contenido principal de la pagina</div>
        <table class="contenido"><tr><td>principal</td></tr></table>
    </body></html>"#;

    let result = extract_content(html);
    assert_eq!(result.fallback, Fallback::Contenido);
    assert_eq!(result.text, "principal");
}

#[test]
fn test_fallback_chain_order() {
    let news = r#"<div class="novedadespop_mensaje">mensaje</div><div id="news-body">noticia</div>"#;
    let result = extract_content(news);
    assert_eq!(result.fallback, Fallback::NewsBody);
    assert_eq!(result.text, "noticia");

    let mensaje = r#"<div class="novedadespop_mensaje">mensaje</div><div>otro texto bastante mas largo</div>"#;
    let result = extract_content(mensaje);
    assert_eq!(result.fallback, Fallback::NovedadesMensaje);
    assert_eq!(result.text, "mensaje");
}

#[test]
fn test_whole_document_fallback() {
    let html = "<html><body><div>Uno</div><div>Dos y tres</div></body></html>";
    let result = extract_content(html);

    assert_eq!(result.fallback, Fallback::Largest);
    assert_eq!(result.text, "Uno\nDos y tres");
    assert_eq!(result.title, None);
    assert_eq!(result.date, None);
}

#[test]
fn test_plain_text_of_sample_page() {
    let text = extract_plain_text(
        r#"<html><body><h1>Title</h1><script>x()</script><p>Paragraph <a href="/a">link</a></p><img src="a.png"></body></html>"#,
    );
    assert_eq!(text, "Title Paragraph link");
}

#[test]
fn test_discover_files_with_glob() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("top.html"), b"<p>a</p>");
    write_file(&dir.path().join("nested/deep/inner.html"), b"<p>b</p>");
    write_file(&dir.path().join("notes.txt"), b"not html");
    fs::create_dir_all(dir.path().join("folder.html")).unwrap();

    let mut files = discover_files(dir.path(), "**/*.html").unwrap();
    files.sort();

    assert_eq!(
        files,
        vec![
            dir.path().join("nested/deep/inner.html"),
            dir.path().join("top.html"),
        ]
    );

    let top_only = discover_files(dir.path(), "*.html").unwrap();
    assert_eq!(top_only, vec![dir.path().join("top.html")]);
}

#[test]
fn test_batch_to_markdown_is_sorted() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(
        &input.path().join("b.html"),
        page(Some("Be"), Some("01/01/2024"), "be").as_bytes(),
    );
    write_file(&input.path().join("a/2.html"), page(None, None, "dos").as_bytes());
    write_file(
        &input.path().join("a/10.html"),
        page(Some("Diez"), None, "diez").as_bytes(),
    );

    let files = discover_files(input.path(), "**/*.html").unwrap();
    let mut results = extract_batch(files, "utf-8", 3).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|(_, r)| r.fallback == Fallback::Contenido));

    let out_file = output.path().join("nested/out.md");
    write_results(&mut results, &out_file, OutputFormat::Markdown).unwrap();

    let written = fs::read_to_string(&out_file).unwrap();
    assert_eq!(written, "# Diez\n\ndiez\n\ndos\n\n01/01/2024\n# Be\n\nbe");
}

#[test]
fn test_batch_to_json_lines() {
    let input = TempDir::new().unwrap();
    write_file(
        &input.path().join("uno.html"),
        page(Some("Título"), None, "cuerpo").as_bytes(),
    );
    write_file(&input.path().join("dos.html"), page(None, None, "otro").as_bytes());

    let files = discover_files(input.path(), "*.html").unwrap();
    let mut results = extract_batch(files, "utf-8", 2).unwrap();

    let out_file = input.path().join("out.jsonl");
    write_results(&mut results, &out_file, OutputFormat::JsonLines).unwrap();

    let written = fs::read_to_string(&out_file).unwrap();
    assert!(written.contains("Título"));

    let records: Vec<serde_json::Value> = written
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert!(records[0]["file"].as_str().unwrap().ends_with("dos.html"));
    assert!(records[0]["title"].is_null());
    assert_eq!(records[0]["text"], "otro");
    assert_eq!(records[1]["title"], "Título");
    assert_eq!(records[1]["text"], "cuerpo");
}

#[test]
fn test_failed_file_does_not_abort_batch() {
    let input = TempDir::new().unwrap();
    let good = input.path().join("good.html");
    write_file(&good, page(None, None, "bien").as_bytes());
    let missing = input.path().join("missing.html");

    let results = extract_batch(vec![missing.clone(), good.clone()], "utf-8", 2).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, good);
    assert_eq!(results[0].1.text, "bien");
    assert_eq!(results[1].0, missing);
    assert_eq!(results[1].1, ExtractionResult::error());
}

#[test]
fn test_utf8_bom_is_removed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bom.html");
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(br#"<div class="novedadespop_mensaje">Hola</div>"#);
    write_file(&path, &bytes);

    let result = process_file(&path, "utf-8");
    assert_eq!(result.fallback, Fallback::NovedadesMensaje);
    assert_eq!(result.text, "Hola");
}

#[test]
fn test_legacy_encoding() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin.html");
    write_file(&path, b"<div id=\"news-body\">Ca\xf1a de az\xfacar</div>");

    let result = process_file(&path, "latin1");
    assert_eq!(result.fallback, Fallback::NewsBody);
    assert_eq!(result.text, "Caña de azúcar");

    let unknown = process_file(&path, "no-such-encoding");
    assert_eq!(unknown.fallback, Fallback::Error);
}
