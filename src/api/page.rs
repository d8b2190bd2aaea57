//! The single HTML page of the web form.

pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="fr">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>CooKin</title>
  <style>
    body { font-family: system-ui, sans-serif; max-width: 42rem; margin: 2rem auto; padding: 0 1rem; }
    textarea, input { width: 100%; box-sizing: border-box; margin: .5rem 0; }
    #answer { white-space: pre-wrap; margin-top: 1rem; }
    .hidden { display: none; }
    aside { margin-top: 2rem; font-size: .9rem; }
  </style>
</head>
<body>
  <h1>&#127860; CooKin</h1>
  <p>Kin spécialiste en cuisine pour vous donner une recette selon votre localisation.</p>

  <section id="key-section" class="hidden">
    <form id="key-form">
      <label for="api-key">Entrez votre clé d'API ChatGPT pour commencer :</label>
      <input id="api-key" type="password" autocomplete="off">
      <button type="submit">Valider</button>
    </form>
    <p><a href="https://platform.openai.com/api-keys">Obtenez une clé d'API OpenAI</a></p>
  </section>

  <section id="recipe-section" class="hidden">
    <form id="recipe-form">
      <label for="text">Donnez moi votre ville, je vais regarder la météo et vous préparer une recette sur mesure :</label>
      <textarea id="text" rows="3"></textarea>
      <button type="submit">Submit</button>
    </form>
    <div id="answer"></div>
    <aside><button id="change-key" type="button">Changer de clé d'API</button></aside>
  </section>

  <script>
    async function refresh() {
      const res = await fetch('/api/session');
      const { has_key } = await res.json();
      document.getElementById('key-section').classList.toggle('hidden', has_key);
      document.getElementById('recipe-section').classList.toggle('hidden', !has_key);
    }
    document.getElementById('key-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const api_key = document.getElementById('api-key').value;
      await fetch('/api/session/key', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ api_key }),
      });
      document.getElementById('api-key').value = '';
      refresh();
    });
    document.getElementById('recipe-form').addEventListener('submit', async (e) => {
      e.preventDefault();
      const answer = document.getElementById('answer');
      answer.textContent = '…';
      const res = await fetch('/api/recipe', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ text: document.getElementById('text').value }),
      });
      const body = await res.json();
      answer.textContent = body.response ?? body.error;
    });
    document.getElementById('change-key').addEventListener('click', async () => {
      await fetch('/api/session/key', { method: 'DELETE' });
      document.getElementById('answer').textContent = '';
      refresh();
    });
    refresh();
  </script>
</body>
</html>
"#;
