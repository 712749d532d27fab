use anyhow::{Result, bail};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::crawler::Category;
use crate::link_graph::PageGraph;

pub const PAGES_FILE: &str = "internal_pages.txt";
pub const REPORT_FILE: &str = "page_status.txt";

/// File each record category is appended to
pub fn file_name(category: Category) -> &'static str {
    match category {
        Category::Email => "emails.txt",
        Category::Subdomain => "sub_domains.txt",
        Category::External => "external_hrefs.txt",
        Category::Source => "src_locations.txt",
        Category::Handler => "onclick.txt",
        Category::Form => "forms.txt",
    }
}

/// Directory of append-only record files, one per category.
/// Every record is flushed as soon as it is written so an interrupted run keeps its results.
pub struct OutputDir {
    path: PathBuf,
    pages: BufWriter<File>,
    records: HashMap<Category, BufWriter<File>>,
}

impl OutputDir {
    /// Creates the directory and its files. Refuses to touch an existing path.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            bail!(
                "directory {} exists. Please delete or rename it and try again.",
                path.display()
            );
        }
        fs::create_dir_all(path)?;

        let pages = BufWriter::new(File::create(path.join(PAGES_FILE))?);
        let mut records = HashMap::new();
        for category in Category::ALL {
            let file = File::create(path.join(file_name(category)))?;
            records.insert(category, BufWriter::new(file));
        }

        Ok(Self {
            path: path.to_path_buf(),
            pages,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_page(&mut self, url: &str) -> Result<()> {
        writeln!(self.pages, "{}", url)?;
        self.pages.flush()?;
        Ok(())
    }

    pub fn write_record(&mut self, category: Category, value: &str) -> Result<()> {
        // every category is opened in `create`
        let writer = self
            .records
            .get_mut(&category)
            .ok_or_else(|| anyhow::anyhow!("no output file for {:?}", category))?;
        writeln!(writer, "{}", value)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes one line per page: URL, status and the first page that linked to it.
    pub fn write_report(&self, graph: &PageGraph) -> Result<()> {
        let mut report = BufWriter::new(File::create(self.path.join(REPORT_FILE))?);
        for (id, page) in graph.pages() {
            let found_on = graph
                .parents(id)
                .first()
                .map(|&parent| graph.page(parent).url.as_str())
                .unwrap_or("-");
            writeln!(report, "{:<70} {:<22} {}", page.url, page.status.to_string(), found_on)?;
        }
        report.flush()?;
        Ok(())
    }

    /// Rewrites every record file sorted and without duplicate lines.
    pub fn sort_records(&mut self) -> Result<()> {
        self.pages.flush()?;
        for writer in self.records.values_mut() {
            writer.flush()?;
        }

        let names = std::iter::once(PAGES_FILE).chain(Category::ALL.into_iter().map(file_name));
        for name in names {
            sort_file(&self.path.join(name))?;
        }
        Ok(())
    }
}

fn sort_file(path: &Path) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let mut lines: Vec<&str> = contents.lines().collect();
    lines.sort_unstable();
    lines.dedup();

    let mut sorted = lines.join("\n");
    if !sorted.is_empty() {
        sorted.push('\n');
    }
    fs::write(path, sorted)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_graph::PageStatus;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sitemapper-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_refuses_existing_dir() -> Result<()> {
        let dir = scratch_dir("existing");
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("emails.txt"), "keep@me.org\n")?;

        let result = OutputDir::create(&dir);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("exists"));
        assert_eq!(fs::read_to_string(dir.join("emails.txt"))?, "keep@me.org\n");

        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_records_written_immediately() -> Result<()> {
        let dir = scratch_dir("immediate");
        let mut output = OutputDir::create(&dir)?;
        output.write_page("http://example.com")?;
        output.write_record(Category::Email, "x@example.com")?;

        // visible before the writer is dropped
        assert_eq!(fs::read_to_string(dir.join(PAGES_FILE))?, "http://example.com\n");
        assert_eq!(fs::read_to_string(dir.join("emails.txt"))?, "x@example.com\n");
        assert_eq!(fs::read_to_string(dir.join("forms.txt"))?, "");

        drop(output);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_sort_records() -> Result<()> {
        let dir = scratch_dir("sort");
        let mut output = OutputDir::create(&dir)?;
        for url in ["http://example.com/b", "http://example.com/a", "http://example.com/b"] {
            output.write_page(url)?;
        }
        output.sort_records()?;

        assert_eq!(
            fs::read_to_string(dir.join(PAGES_FILE))?,
            "http://example.com/a\nhttp://example.com/b\n"
        );
        assert_eq!(fs::read_to_string(dir.join("onclick.txt"))?, "");

        drop(output);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn test_report_lists_status_and_parent() -> Result<()> {
        let dir = scratch_dir("report");
        let output = OutputDir::create(&dir)?;

        let mut graph = PageGraph::new();
        let (root, _) = graph.get_or_insert("http://example.com");
        let (about, _) = graph.get_or_insert("http://example.com/about");
        graph.link(root, about);
        graph.transition(root, PageStatus::Fetching);
        graph.transition(root, PageStatus::Visited(200));

        output.write_report(&graph)?;
        let report = fs::read_to_string(dir.join(REPORT_FILE))?;
        let lines: Vec<Vec<&str>> = report.lines().map(|l| l.split_whitespace().collect()).collect();
        assert_eq!(lines[0], vec!["http://example.com", "visited:200", "-"]);
        assert_eq!(lines[1], vec!["http://example.com/about", "unvisited", "http://example.com"]);

        drop(output);
        fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
