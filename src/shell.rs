//! 行指向のコマンドシェル
//!
//! GUI シェルの代わりに標準入力から編集要求を読み取り、ファサードへ渡す。
//! ファイルの読み書きはここで行い、コアには内容だけを渡す。

use crate::config::EditorConfig;
use crate::editor::{TextEditor, TextMirror};
use anyhow::{anyhow, bail, Context};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// シェルコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert { position: usize, text: String },
    Delete { position: usize, len: usize },
    Replace { position: usize, len: usize, text: String },
    Undo,
    Redo,
    Open(PathBuf),
    Save(PathBuf),
    Print,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  insert <pos> <text>         insert text (\\n, \\t, \\\\ escapes)
  delete <pos> <len>          delete len characters
  replace <pos> <len> <text>  replace len characters with text
  undo | redo
  open <path> | save <path>
  print | help | quit";

impl Command {
    /// 1 行を解釈する。空行とコメント行は `None`
    pub fn parse(line: &str) -> anyhow::Result<Option<Command>> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = split_word(trimmed);
        let command = match name {
            "insert" | "i" => {
                let (position, text) = split_word(rest);
                Command::Insert {
                    position: parse_number(position, "position")?,
                    text: unescape(text)?,
                }
            }
            "delete" | "d" => {
                let (position, rest) = split_word(rest);
                let (len, extra) = split_word(rest);
                if !extra.trim().is_empty() {
                    bail!("unexpected argument: {}", extra.trim());
                }
                Command::Delete {
                    position: parse_number(position, "position")?,
                    len: parse_number(len, "length")?,
                }
            }
            "replace" | "r" => {
                let (position, rest) = split_word(rest);
                let (len, text) = split_word(rest);
                Command::Replace {
                    position: parse_number(position, "position")?,
                    len: parse_number(len, "length")?,
                    text: unescape(text)?,
                }
            }
            "undo" | "u" => Command::Undo,
            "redo" => Command::Redo,
            "open" => Command::Open(parse_path(rest)?),
            "save" => Command::Save(parse_path(rest)?),
            "print" | "p" => Command::Print,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => bail!("unknown command: {}", other),
        };
        Ok(Some(command))
    }
}

/// 先頭の単語と残り（区切りの空白 1 つを除いたもの）に分ける
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(' ') {
        Some(idx) => (&input[..idx], &input[idx + 1..]),
        None => (input, ""),
    }
}

fn parse_number(raw: &str, what: &str) -> anyhow::Result<usize> {
    if raw.is_empty() {
        bail!("missing {}", what);
    }
    raw.parse::<usize>()
        .with_context(|| format!("invalid {}: {}", what, raw))
}

fn parse_path(raw: &str) -> anyhow::Result<PathBuf> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("missing path");
    }
    Ok(PathBuf::from(raw))
}

fn unescape(raw: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(anyhow!("unknown escape: \\{}", other)),
            None => return Err(anyhow!("dangling escape at end of text")),
        }
    }
    Ok(out)
}

/// コマンド実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 表示するメッセージ
    Message(String),
    Quit,
}

/// エディタとビューをまとめたシェル
pub struct Shell {
    editor: TextEditor,
    view: TextMirror,
}

impl Shell {
    pub fn new(config: EditorConfig) -> anyhow::Result<Self> {
        let mut editor = TextEditor::with_config(config).context("invalid editor configuration")?;
        let view = TextMirror::new();
        editor.add_change_listener(Box::new(view.clone()));
        Ok(Self { editor, view })
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    /// ビュー側の内容
    pub fn view_text(&self) -> String {
        self.view.text()
    }

    /// 1 コマンドを実行
    pub fn execute(&mut self, command: Command) -> anyhow::Result<Outcome> {
        let changed = match command {
            Command::Insert { position, text } => self.editor.insert_text(position, &text)?,
            Command::Delete { position, len } => self.editor.delete_range(position, len)?,
            Command::Replace {
                position,
                len,
                text,
            } => self.editor.replace_range(position, len, &text)?,
            Command::Undo => self.editor.undo()?,
            Command::Redo => self.editor.redo()?,
            Command::Open(path) => {
                self.open(&path)?;
                return Ok(Outcome::Message(format!(
                    "opened {} ({} chars)",
                    path.display(),
                    self.editor.len_chars()
                )));
            }
            Command::Save(path) => {
                self.save(&path)?;
                return Ok(Outcome::Message(format!("saved {}", path.display())));
            }
            Command::Print => return Ok(Outcome::Message(self.view.text())),
            Command::Help => return Ok(Outcome::Message(HELP.to_string())),
            Command::Quit => return Ok(Outcome::Quit),
        };

        let message = if changed { "ok" } else { "no change" };
        Ok(Outcome::Message(message.to_string()))
    }

    /// ファイルを読み込んで内容全体を置き換える
    pub fn open(&mut self, path: &std::path::Path) -> anyhow::Result<()> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        self.editor.load_content(&text);
        Ok(())
    }

    /// 現在の内容をファイルへ書き出す
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        std::fs::write(path, self.editor.get_text())
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// 入力が尽きるか `quit` まで行単位で処理する
    ///
    /// 個々のコマンドの失敗は出力に報告して続行する。
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    log::warn!("rejected command {:?}: {:#}", line, err);
                    writeln!(output, "error: {:#}", err)?;
                    continue;
                }
            };

            match self.execute(command) {
                Ok(Outcome::Message(message)) => writeln!(output, "{}", message)?,
                Ok(Outcome::Quit) => break,
                Err(err) => {
                    log::error!("command failed: {:#}", err);
                    writeln!(output, "error: {:#}", err)?;
                }
            }
        }
        output.flush()?;
        Ok(())
    }
}
