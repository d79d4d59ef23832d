#[cfg(test)]
pub const LEGACY_POST_HTML: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Festa dei volontari – ARCS-VV</title>
  <link rel="icon" type="image/x-icon" href="../../icons/favicon.ico">
  <link rel="stylesheet" href="../../main.css?v=1080">
</head>
<body>
  <div id="menu-inject"></div>
  <script src="../../menu.js"></script>
  <main style="max-width:800px;margin:auto;">
    <h1>Festa dei volontari – ARCS-VV</h1>
    <p style="color:#888;font-size:0.95em;">Pubblicato il 2025-06-14 da ARCS-VV</p>
    <img src="../../immagini/festa.jpg" alt="Festa dei volontari" style="width:100%;height:300px;object-fit:cover;">
    <div class="blog-content">
      <p>Una serata insieme per ringraziare chi ci aiuta.</p>
    </div>
    <p><a href="../news.html">&larr; Torna all'elenco news</a></p>
  </main>
</body>
</html>"#;

#[cfg(test)]
pub const NO_TITLE_HTML: &str = "<html><body>
<p>Solo testo.</p>
</body></html>";

#[cfg(test)]
pub const LISTING_HTML: &str = r#"<!DOCTYPE html>
<html lang="it">
<head>
  <meta charset="UTF-8">
  <title>News – ARCS-VV</title>
</head>
<body class="page-news">
  <h1 class="page-title news-title">News</h1>

  <table width="100%" cellpadding="0" cellspacing="0" border="0" style="margin:0 auto;max-width:900px;">
      <tr><td>vecchio contenuto</td></tr>
  </table>

      <!-- Layout alternativo per MOBILE -->
      <div class="mobile-blog-container" style="display: none;"></div>
</body>
</html>"#;
