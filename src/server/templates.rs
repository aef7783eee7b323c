//! HTML templates for the web interface.

/// Page title shown in the tab and heading.
pub const PAGE_TITLE: &str = "Grounded Q&amp;A Extraction";

/// Base HTML template around the upload form.
pub fn base_template(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - groundqa</title>
    <style>{style}</style>
</head>
<body>
    <header id="main-header">
        <nav><a href="/" class="logo">groundqa</a></nav>
    </header>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#,
        title = PAGE_TITLE,
        style = STYLE,
        content = content
    )
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f7f7f8; color: #1d1d1f; }
#main-header { background: #1d1d1f; padding: 0.75rem 1.5rem; }
#main-header .logo { color: #fff; text-decoration: none; font-weight: 600; }
main { max-width: 56rem; margin: 0 auto; padding: 1.5rem; }
.hint { color: #555; }
progress { width: 100%; height: 1rem; }
#log { list-style: none; padding: 0; font-family: ui-monospace, monospace; font-size: 0.9rem; }
#log li.warn { color: #a15c00; }
#log li.error { color: #b00020; }
#log li.success { color: #1b7a2f; }
#log li.detail { color: #666; padding-left: 1.5rem; }
.preview { background: #fff; border: 1px solid #ddd; border-radius: 6px; padding: 0.75rem; margin: 0.5rem 0; }
.preview blockquote { margin: 0.5rem 0; padding-left: 0.75rem; border-left: 3px solid #ccc; color: #444; }
.hidden { display: none; }
"#;

/// Upload form plus the script that follows job progress.
pub fn upload_form() -> String {
    format!(
        r#"<p class="hint">Extract technical Q&amp;A pairs from PDF manuals. Every entry carries a page
number, a verbatim quote and the section it came from; entries without them are dropped.</p>
<form id="upload-form">
    <input type="file" id="files" name="files" accept=".pdf,application/pdf" multiple>
    <button type="submit" id="start">Start deep extraction</button>
</form>
<section id="progress-section" class="hidden">
    <progress id="progress" value="0" max="1"></progress>
    <p id="current"></p>
    <ul id="log"></ul>
</section>
<section id="results" class="hidden">
    <h2>Preview</h2>
    <div id="previews"></div>
    <p><a id="download" href="/api/extract/download" download="{output}">Download JSONL</a></p>
    <details id="raw">
        <summary>View Raw JSON (all entries)</summary>
        <pre id="raw-json"></pre>
    </details>
</section>
<script>{script}</script>"#,
        output = crate::batch::DEFAULT_OUTPUT,
        script = SCRIPT
    )
}

const SCRIPT: &str = r#"
const form = document.getElementById('upload-form');
const log = document.getElementById('log');

function esc(s) {
    const div = document.createElement('div');
    div.textContent = s == null ? '' : String(s);
    return div.innerHTML;
}

function render(status) {
    document.getElementById('progress-section').classList.remove('hidden');
    const bar = document.getElementById('progress');
    bar.max = Math.max(status.files_total, 1);
    bar.value = status.files_done;
    document.getElementById('current').textContent = status.current_file
        ? 'Processing ' + status.current_file + ' (' + (status.files_done + 1) + '/' + status.files_total + ')'
        : '';
    log.innerHTML = status.messages
        .map(m => '<li class="' + m.level + '">' + esc(m.text) + '</li>')
        .join('');

    const results = document.getElementById('results');
    if (status.state === 'complete' && status.entries > 0) {
        results.classList.remove('hidden');
        document.getElementById('previews').innerHTML = status.previews.map(r =>
            '<div class="preview"><strong>' + esc(r.instruction) + '</strong>' +
            (r.input ? '<p><em>' + esc(r.input) + '</em></p>' : '') +
            '<p>' + esc(r.output) + '</p>' +
            '<blockquote>' + esc(r.source_quote) + '</blockquote>' +
            '<small>Page ' + esc(r.page_number) + ' &middot; ' + esc(r.section) + '</small></div>'
        ).join('');
        loadRecords();
    } else {
        results.classList.add('hidden');
    }
    document.getElementById('start').disabled = status.state === 'running';
}

async function loadRecords() {
    const resp = await fetch('/api/extract/records');
    const records = await resp.json();
    document.getElementById('raw-json').textContent = JSON.stringify(records, null, 2);
}

async function poll() {
    const resp = await fetch('/api/extract/status');
    const status = await resp.json();
    render(status);
    if (status.state === 'running') {
        setTimeout(poll, 1000);
    }
}

form.addEventListener('submit', async (event) => {
    event.preventDefault();
    const input = document.getElementById('files');
    if (!input.files.length) {
        alert('Please upload at least one PDF file.');
        return;
    }
    const data = new FormData();
    for (const file of input.files) {
        data.append('files', file, file.name);
    }
    const resp = await fetch('/api/extract', { method: 'POST', body: data });
    if (!resp.ok) {
        const body = await resp.json().catch(() => ({ error: resp.statusText }));
        alert(body.error);
        return;
    }
    poll();
});

poll();
"#;
