use loginport_domain::client::ClientRecord;

const LISTING_TEMPLATE: &str = include_str!("../../assets/listing.html");
const PASSWORD_MASK: &str = "••••••••";

/// Escape text for use in element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// The listing page with one row per client.
pub fn render_listing(clients: &[ClientRecord]) -> String {
    let rows: String = clients.iter().map(render_row).collect();
    LISTING_TEMPLATE
        .replace("{{CLIENT_COUNT}}", &clients.len().to_string())
        .replace("{{CLIENT_ROWS}}", &rows)
}

fn render_row(client: &ClientRecord) -> String {
    let name = escape_html(client.name());
    let account = escape_html(client.account());
    let username = escape_html(client.username());
    let password = escape_html(client.password());
    let secret = escape_html(client.mfa_secret());

    format!(
        r#"    <li class="client" data-name="{name}" data-account="{account}" data-secret="{secret}">
      <div class="column editable col-name" data-field="name"><span>{name}</span><input type="text" value="{name}"></div>
      <div class="column editable col-account" data-field="account"><span>{account}</span><input type="text" value="{account}"></div>
      <div class="column editable col-username" data-field="username"><span>{username}</span><input type="text" value="{username}"></div>
      <div class="column editable col-password" data-field="password"><span>{mask}</span><input type="text" value="{password}"></div>
      <div class="column col-actions"><button class="btn-mfa">Copy MFA</button> <button class="btn-login">Login</button></div>
    </li>
"#,
        mask = PASSWORD_MASK,
    )
}
