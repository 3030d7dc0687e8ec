use chrono::Utc;

/// Deterministic "hacker alias" derived from a user id, shown next to
/// the session instead of a real username. Same char-sum hash the
/// dashboard header has always used.
pub fn codename(user_id: &str) -> String {
    const PREFIXES: [&str; 10] = [
        "SHADOW", "GHOST", "PHANTOM", "CYBER", "DARK", "NEO", "ZERO", "ALPHA", "OMEGA", "VIPER",
    ];
    const SUFFIXES: [&str; 10] = [
        "HAWK", "WOLF", "DRAGON", "BLADE", "STORM", "REAPER", "HUNTER", "KNIGHT", "NINJA", "ROGUE",
    ];
    let hash: u64 = user_id.bytes().map(u64::from).sum();
    let prefix = PREFIXES[(hash % PREFIXES.len() as u64) as usize];
    let suffix = SUFFIXES[((hash * 7) % SUFFIXES.len() as u64) as usize];
    let number = hash % 900 + 100;
    format!("{prefix}_{suffix}{number}")
}

pub fn render_index() -> String {
    INDEX_HTML.replace("{{BOOT_TIME}}", &Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>hackdesk</title>
  <style>
    :root {
      --bg: #020a08;
      --green: #00ff99;
      --cyan: #00d8ff;
      --yellow: #ffd24a;
      --red: #ff5566;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, rgba(0, 255, 153, 0.08), transparent 55%), var(--bg);
      color: var(--green);
      font-family: "Fira Code", "Courier New", monospace;
      display: grid;
      place-items: center;
      padding: 24px;
    }

    .window {
      width: min(820px, 100%);
      border: 1px solid rgba(0, 255, 153, 0.5);
      border-radius: 6px;
      background: rgba(0, 20, 16, 0.92);
      box-shadow: 0 0 42px rgba(0, 255, 153, 0.12);
    }

    .titlebar {
      padding: 8px 14px;
      border-bottom: 1px solid rgba(0, 255, 153, 0.3);
      color: var(--cyan);
      letter-spacing: 1px;
    }

    .terminal {
      padding: 16px;
      min-height: 320px;
      max-height: 60vh;
      overflow-y: auto;
      font-size: 14px;
      line-height: 1.6;
    }

    .line .cyan { color: var(--cyan); }
    .line .yellow { color: var(--yellow); }
    .line .red { color: var(--red); }

    .prompt-row {
      display: flex;
      gap: 8px;
      padding: 10px 16px 16px;
    }

    .prompt { color: var(--cyan); white-space: nowrap; }

    input {
      flex: 1;
      background: transparent;
      border: none;
      outline: none;
      color: var(--green);
      font: inherit;
    }
  </style>
</head>
<body>
  <div class="window">
    <div class="titlebar">&#9484;&#9472;[NETWORK SCANNER]&#9472;[HACKDESK]</div>
    <div class="terminal" id="terminal">
      <div class="line">[boot] {{BOOT_TIME}}</div>
      <div class="line">[boot] Initializing network scanner...</div>
    </div>
    <div class="prompt-row">
      <span class="prompt">kali@root:~$</span>
      <input id="ip-input" placeholder="Enter IP address and press Enter" autofocus
             spellcheck="false" autocomplete="off" />
    </div>
  </div>
  <script>
    const terminal = document.getElementById('terminal');
    const input = document.getElementById('ip-input');

    function print(text, cls) {
      const line = document.createElement('div');
      line.className = 'line';
      if (cls) {
        const span = document.createElement('span');
        span.className = cls;
        span.textContent = text;
        line.appendChild(span);
      } else {
        line.textContent = text;
      }
      terminal.appendChild(line);
      terminal.scrollTop = terminal.scrollHeight;
    }

    function printInfo(payload) {
      if (!payload || !payload.info || typeof payload.info !== 'object') {
        print('[error] No data returned', 'red');
        return;
      }
      for (const [key, value] of Object.entries(payload.info)) {
        print(key + ': ' + value);
      }
    }

    function runLookup(ip) {
      fetch('/api/run', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ ip })
      })
        .then(r => r.json())
        .then(j => j.error ? print('[error] ' + j.error, 'red') : printInfo(j))
        .catch(e => print('[error] ' + e.message, 'red'));
    }

    fetch('/api/ipinfo')
      .then(r => r.json())
      .then(j => {
        if (j.error) { print('[error] ' + j.error, 'red'); return; }
        print('[info] Public IP: ' + j.ip, 'cyan');
        printInfo(j);
      })
      .catch(e => print('[error] ' + e.message, 'red'));

    input.addEventListener('keydown', e => {
      if (e.key !== 'Enter') return;
      const ip = input.value.trim();
      if (!ip) return;
      print('kali@root:~$ ' + ip, 'yellow');
      input.value = '';
      runLookup(ip);
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codename_is_deterministic_per_user() {
        let id = "5f2d9c1e-0000-4000-8000-123456789abc";
        assert_eq!(codename(id), codename(id));
        let alias = codename(id);
        let (prefix, rest) = alias.split_once('_').expect("prefix separator");
        assert!(!prefix.is_empty());
        let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
        let number: u64 = digits.parse().unwrap();
        assert!((100..1000).contains(&number));
    }

    #[test]
    fn index_page_substitutes_the_boot_time() {
        let page = render_index();
        assert!(!page.contains("{{BOOT_TIME}}"));
        assert!(page.contains("NETWORK SCANNER"));
    }
}
