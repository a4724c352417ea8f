use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

const HEADER_CELLS: &[&str] = &[
    "Jour",
    "Heure",
    "Temp.",
    "Windchill",
    "Dir.",
    "Vent moy.",
    "Rafales",
    "Pluie<br>sur {granularity}",
    "Humidité",
    "Pression",
    "Temps",
];

/// One forecast row shaped like meteociel's grids: a day-start row has the
/// spanning day cell plus ten data cells, a continuation row only the ten.
#[derive(Debug, Clone)]
pub struct PageRow {
    day: Option<(String, u32)>,
    hour: String,
    rain: String,
}

impl PageRow {
    pub fn day_start(day: &str, rowspan: u32, hour: &str, rain: &str) -> Self {
        Self {
            day: Some((day.to_string(), rowspan)),
            hour: hour.to_string(),
            rain: rain.to_string(),
        }
    }

    pub fn continuation(hour: &str, rain: &str) -> Self {
        Self {
            day: None,
            hour: hour.to_string(),
            rain: rain.to_string(),
        }
    }

    fn to_html(&self) -> String {
        let day_cell = self
            .day
            .as_ref()
            .map(|(day, rowspan)| {
                let (name, number) = day.split_at(day.len().min(3));
                format!(r#"<td rowspan="{rowspan}" align="center">{name}<br>{number}<br></td>"#)
            })
            .unwrap_or_default();

        format!(
            concat!(
                r##"<tr bgcolor="#CCFFFF">{day_cell}<td>{hour}</td>"##,
                r#"<td align="center">12 °C</td><td class="wndchill">10</td>"#,
                r#"<td><img alt="Ouest : 270 °"></td><td>15</td><td>30</td>"#,
                r#"<td align="center">{rain}</td><td>80 %</td><td>1015 hPa</td>"#,
                r#"<td><img alt="Averses"></td></tr>"#
            ),
            day_cell = day_cell,
            hour = self.hour,
            rain = self.rain,
        )
    }
}

fn header_row(granularity: &str, bgcolor: &str) -> String {
    let cells: String = HEADER_CELLS
        .iter()
        .map(|cell| cell.replace("{granularity}", granularity))
        .map(|cell| format!("<td>{cell}</td>"))
        .collect();
    format!(r#"<tr bgcolor="{bgcolor}">{cells}</tr>"#)
}

fn grid(granularity: &str, header_bgcolor: &str, rows: &[PageRow]) -> String {
    let body: String = rows.iter().map(PageRow::to_html).collect();
    format!(
        "<table border=\"1\">{}{body}</table>",
        header_row(granularity, header_bgcolor)
    )
}

/// A 3-hour page (GFS/WRF/AROME): grid wrapped in two layout tables.
pub fn three_hour_page(update_text: &str, rows: &[PageRow]) -> String {
    format!(
        concat!(
            "<html><head><title>Prévisions</title></head><body>",
            "<center>{update}</center>",
            "<table width=\"100%\"><tr><td>",
            "<table><tr><td>{grid}</td></tr></table>",
            "</td></tr></table>",
            "</body></html>"
        ),
        update = update_text,
        grid = grid("3h", "#aaaaff", rows),
    )
}

/// An hourly page (ARPEGE/ICON-EU), same wrapping as the 3-hour pages.
pub fn hourly_page(update_text: &str, rows: &[PageRow]) -> String {
    format!(
        concat!(
            "<html><body>",
            "<center>{update}</center>",
            "<table width=\"100%\"><tr><td>",
            "<table><tr><td>{grid}</td></tr></table>",
            "</td></tr></table>",
            "</body></html>"
        ),
        update = update_text,
        grid = grid("1h", "#aaaaff", rows),
    )
}

/// The AROME-1h page layout: the grid sits four tables below the second
/// cell of the first table.
pub fn nested_hourly_page(center_text: &str, rows: &[PageRow]) -> String {
    format!(
        concat!(
            "<html><body>",
            "<center>{center}</center>",
            "<table><tr><td>menu</td><td>",
            "<table><tr><td>",
            "<table><tr><td>",
            "<table><tr><td>",
            "{grid}",
            "</td></tr></table>",
            "</td></tr></table>",
            "</td></tr></table>",
            "</td></tr></table>",
            "</body></html>"
        ),
        center = center_text,
        grid = grid("1h", "#aaaaff", rows),
    )
}

#[derive(Debug, Clone)]
pub struct PageRoute {
    pub path: String,
    pub status: u16,
    pub body: String,
}

impl PageRoute {
    pub fn ok(path: &str, body: String) -> Self {
        Self {
            path: path.to_string(),
            status: 200,
            body,
        }
    }

    pub fn status(path: &str, status: u16) -> Self {
        Self {
            path: path.to_string(),
            status,
            body: String::new(),
        }
    }
}

/// Minimal HTTP/1.1 responder on a loopback port, one response per connection.
pub struct PageServer {
    pub base_url: String,
    received: Arc<Mutex<Vec<String>>>,
}

impl PageServer {
    pub fn start(routes: Vec<PageRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("page server should bind");
        let address = listener
            .local_addr()
            .expect("page server address should be available");
        let received = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&received);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    break;
                };
                let request = read_request(&mut stream);
                let path = request
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                log.lock().expect("request log lock").push(request);

                let (status, body) = routes
                    .iter()
                    .find(|route| route.path == path)
                    .map(|route| (route.status, route.body.clone()))
                    .unwrap_or((404, "not found".to_string()));
                let response = format!(
                    concat!(
                        "HTTP/1.1 {status} {reason}\r\n",
                        "Content-Type: text/html; charset=utf-8\r\n",
                        "Content-Length: {length}\r\n",
                        "Connection: close\r\n\r\n",
                        "{body}"
                    ),
                    status = status,
                    reason = reason_phrase(status),
                    length = body.len(),
                    body = body,
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            base_url: format!("http://{address}"),
            received,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn requests(&self) -> Vec<String> {
        self.received.lock().expect("request log lock").clone()
    }
}

/// URL of a loopback port nothing listens on.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("spare socket should bind");
    let address = listener
        .local_addr()
        .expect("spare address should be available");
    drop(listener);
    format!("http://{address}")
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(size) => {
                buffer.extend_from_slice(&chunk[..size]);
                if buffer.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    String::from_utf8_lossy(&buffer).into_owned()
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
