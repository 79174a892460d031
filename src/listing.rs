use anyhow::Result;
use html_escape::encode_text;
use natord::compare_ignore_case;
use std::{fs::read_dir, io::Cursor, path::Path};
use tiny_http::{Header, Response};
use urlencoding::encode;

pub struct Listing {
    url_path: String,
    entries: Vec<Entry>,
}

struct Entry {
    name: String,
    is_dir: bool,
}

impl Listing {
    pub fn new(directory: &Path, url_path: &str) -> Result<Self> {
        let mut entries = vec![];

        for entry in read_dir(directory)? {
            let Ok(entry) = entry else { continue };
            let is_dir = entry.file_type().is_ok_and(|file_type| file_type.is_dir());

            entries.push(Entry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir,
            });
        }

        entries.sort_by(|a, b| compare_ignore_case(&a.name, &b.name));

        Ok(Self {
            url_path: url_path.to_string(),
            entries,
        })
    }

    fn html(&self) -> String {
        let title = format!("Directory listing for {}", encode_text(&self.url_path));
        let info_element = format!("<div>{} entries</div>", self.entries.len());

        let mut entry_elements = String::new();

        for entry in &self.entries {
            let trailing = if entry.is_dir { "/" } else { "" };

            entry_elements += &format!(
                r#"<li><a href="{}{trailing}">{}{trailing}</a></li>"#,
                encode(&entry.name),
                encode_text(&entry.name),
            );
        }

        format!(
            r#"
			<!DOCTYPE html>
			<html lang="en">
                <head>
                    <title>{title}</title>
                    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
                    <style>
                        body {{
                            font-family: Segoe UI, Arial, Helvetica, sans-serif;
                            margin: 20px;
                        }}

                        .entries {{
                            display: flex;
                            flex-direction: column;
                            gap: 5px;
                            list-style: none;
                            padding: 0;

                            a {{
                                text-decoration: none;
                                word-break: break-all;
                            }}
                        }}
                    </style>
                </head>
                <body>
                    <h1>{title}</h1>
                    {info_element}
                    <hr />
                    <ul class="entries">{entry_elements}</ul>
                    <hr />
                </body>
			</html>
			"#
        )
    }
}

impl From<Listing> for Response<Cursor<Vec<u8>>> {
    fn from(value: Listing) -> Self {
        let mut response = Response::from_string(value.html());

        if let Ok(header) = Header::from_bytes("content-type", "text/html") {
            response = response.with_header(header);
        }

        response
    }
}
