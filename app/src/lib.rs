mod config;

pub use config::{config_path, init_config, load_config, save_config, AppConfig, ConfigError, DEFAULT_CONFIG_FILE};

use anyhow::{anyhow, bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use wordswap_core::document::{Document, Page};
use wordswap_core::{CoreError, Dictionary};
use wordswap_render::OutputFormat;
use wordswap_rules::WordPack;
use wordswap_verify::{verify_replacement, VerifyOptions};

// ============================================================================
// 文档加载
// ============================================================================

/// 文档信息
#[derive(Clone, serde::Serialize)]
pub struct DocumentInfo {
    pub path: String,
    pub name: String,
    pub file_type: String,
    pub pages: Vec<Page>,
    pub total_pages: usize,
    pub supported_features: Vec<String>,
}

impl DocumentInfo {
    /// 全部页面文本，页与页之间以换行分隔
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 根据文件扩展名选择对应的处理器加载文档
pub fn load_document(path: &Path) -> Result<DocumentInfo> {
    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "txt" => load_with_handler::<wordswap_text::TextDocument>(path, "txt"),
        "md" => load_with_handler::<wordswap_text::TextDocument>(path, "md"),
        _ => Err(anyhow!("不支持的文件类型: {}", extension)),
    }
}

fn load_with_handler<D: Document>(path: &Path, file_type: &str) -> Result<DocumentInfo> {
    let doc = D::load(path)?;
    let pages = doc.get_pages()?;
    let total_pages = pages.len();
    let supported_features = doc.get_supported_features();

    Ok(DocumentInfo {
        path: path.to_string_lossy().to_string(),
        name: path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
        file_type: file_type.to_string(),
        pages,
        total_pages,
        supported_features,
    })
}

// ============================================================================
// 词库
// ============================================================================

/// 加载词典：.csv 按表格导入，其余按 JSON 词库读取
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let is_csv = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let dictionary = if is_csv {
        Dictionary::new(wordswap_rules::read_csv(path).with_context(|| format!("无法读取词库: {}", path.display()))?)
    } else {
        if !path.exists() {
            bail!("词库文件不存在: {}", path.display());
        }
        WordPack::load(path)
            .with_context(|| format!("无法读取词库: {}", path.display()))?
            .dictionary()
    };

    log::info!("[Dictionary] 已加载 {} 个词条", dictionary.len());
    Ok(dictionary)
}

/// 从 CSV 导入词库，返回导入数量
pub fn import_dictionary(csv: &Path, store: &Path, name: Option<&str>) -> Result<usize> {
    let terms = wordswap_rules::read_csv(csv).with_context(|| format!("无法读取表格: {}", csv.display()))?;
    if terms.is_empty() {
        bail!("表格中没有找到有效的词条数据");
    }

    let mut pack = WordPack::load(store)?;
    if let Some(name) = name {
        pack.name = name.to_string();
    }
    let count = pack.import(terms);
    pack.save(store)?;

    log::info!("[Dictionary] 词库更新成功，共导入 {} 个词条: {}", count, store.display());
    Ok(count)
}

pub fn list_dictionary(store: &Path) -> Result<WordPack> {
    Ok(WordPack::load(store)?)
}

pub fn clear_dictionary(store: &Path) -> Result<()> {
    let mut pack = WordPack::load(store)?;
    pack.clear();
    pack.save(store)?;
    log::info!("[Dictionary] 词库已清空: {}", store.display());
    Ok(())
}

// ============================================================================
// 替换
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ReplaceRequest {
    pub input: PathBuf,
    /// 覆盖配置中的词库路径
    pub dictionary: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub strict: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ReplaceOutcome {
    pub output_path: PathBuf,
    pub match_count: usize,
    pub message: String,
    pub warnings: Vec<String>,
}

/// 处理一个文档：替换、校验并写出对照文档
pub fn run_replace(config: &AppConfig, request: &ReplaceRequest) -> Result<ReplaceOutcome> {
    let dictionary_path = request
        .dictionary
        .clone()
        .or_else(|| config.dictionary_path.as_ref().map(PathBuf::from))
        .ok_or_else(|| anyhow!("未指定词库，请使用 --dict 或在配置中设置 dictionaryPath"))?;

    let document = load_document(&request.input)?;
    let text = document.text();
    if text.trim().is_empty() {
        return Err(CoreError::NoProcessableText.into());
    }

    let chars = text.chars().count();
    if chars > config.max_text_chars {
        bail!("文本过长: {} 个字符，上限 {}", chars, config.max_text_chars);
    }

    let dictionary = load_dictionary(&dictionary_path)?;
    if dictionary.len() > config.max_terms {
        bail!("词条过多: {} 条，上限 {}", dictionary.len(), config.max_terms);
    }

    let strict = request.strict || config.strict;
    if strict && dictionary.is_empty() {
        return Err(CoreError::NothingToReplace.into());
    }

    let replacement = wordswap_core::process_document(&text, &dictionary, strict)
        .with_context(|| format!("处理失败: {}", document.name))?;

    let verified = verify_replacement(&replacement, &dictionary, &VerifyOptions::default());
    if !verified.ok {
        bail!("替换结果校验失败: {}", verified.errors.join("; "));
    }

    let format = request.format.unwrap_or(config.output_format);
    let renderer = format.renderer(config.render.clone());
    let bytes = renderer.render(&replacement)?;

    let output_path = request
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&request.input, renderer.extension()));
    if let Some(dir) = output_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(&output_path, bytes).with_context(|| format!("无法写入: {}", output_path.display()))?;

    let message = replacement.summary();
    log::info!("[Replace] {} -> {}", message, output_path.display());

    Ok(ReplaceOutcome {
        output_path,
        match_count: replacement.match_count(),
        message,
        warnings: verified.warnings,
    })
}

/// `notice.txt` -> `notice_replaced.html`
fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_replaced.{}", stem, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(text: &str, csv: &str) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notice.txt");
        let dict = dir.path().join("words.csv");
        fs::write(&input, text).unwrap();
        fs::write(&dict, csv).unwrap();
        (dir, input, dict)
    }

    #[test]
    fn test_run_replace_writes_html() {
        let (_dir, input, dict) = setup("公司决定裁员以降低成本\n贿赂官员", "裁员,优化人员结构\n贿赂,礼品\n贿赂官员,商业往来\n");
        let request = ReplaceRequest {
            input: input.clone(),
            dictionary: Some(dict),
            ..ReplaceRequest::default()
        };

        let outcome = run_replace(&AppConfig::default(), &request).unwrap();
        assert_eq!(outcome.match_count, 2);
        assert_eq!(outcome.message, "替换完成，共替换了 2 个词");
        assert_eq!(outcome.output_path, input.with_file_name("notice_replaced.html"));

        let html = fs::read_to_string(&outcome.output_path).unwrap();
        assert!(html.contains("<mark class=\"substitute\">商业往来</mark>"));
    }

    #[test]
    fn test_run_replace_text_format_and_output_path() {
        let (dir, input, dict) = setup("AABB", "AA,11\nBB,22\n");
        let output = dir.path().join("out").join("result.txt");
        let request = ReplaceRequest {
            input,
            dictionary: Some(dict),
            output: Some(output.clone()),
            format: Some(OutputFormat::Text),
            strict: false,
        };

        run_replace(&AppConfig::default(), &request).unwrap();
        let text = fs::read_to_string(output).unwrap();
        assert!(text.contains("{+11+}{+22+}"));
    }

    #[test]
    fn test_run_replace_blank_text() {
        let (_dir, input, dict) = setup("   \n", "裁员,优化\n");
        let request = ReplaceRequest {
            input,
            dictionary: Some(dict),
            ..ReplaceRequest::default()
        };
        let err = run_replace(&AppConfig::default(), &request).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::NoProcessableText)));
    }

    #[test]
    fn test_run_replace_strict_nothing_to_replace() {
        let (_dir, input, dict) = setup("正常文本", "敏感词,X\n");
        let request = ReplaceRequest {
            input: input.clone(),
            dictionary: Some(dict.clone()),
            strict: true,
            ..ReplaceRequest::default()
        };
        let err = run_replace(&AppConfig::default(), &request).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::NothingToReplace)));

        let relaxed = ReplaceRequest {
            strict: false,
            ..request
        };
        assert_eq!(run_replace(&AppConfig::default(), &relaxed).unwrap().match_count, 0);
    }

    #[test]
    fn test_run_replace_blank_text_wins_over_empty_dictionary() {
        let (_dir, input, dict) = setup("\n  ", "只有一列\n");
        let request = ReplaceRequest {
            input,
            dictionary: Some(dict),
            strict: true,
            ..ReplaceRequest::default()
        };
        let err = run_replace(&AppConfig::default(), &request).unwrap_err();
        assert!(matches!(err.downcast_ref::<CoreError>(), Some(CoreError::NoProcessableText)));
    }

    #[test]
    fn test_run_replace_ignores_multi_line_dictionary_row() {
        let (_dir, input, dict) = setup("第一行结尾\n开头第二行，裁员", "\"结尾\n开头\",衔接\n裁员,优化\n");
        let request = ReplaceRequest {
            input,
            dictionary: Some(dict),
            format: Some(OutputFormat::Text),
            ..ReplaceRequest::default()
        };

        let outcome = run_replace(&AppConfig::default(), &request).unwrap();
        assert_eq!(outcome.match_count, 1);
        let text = fs::read_to_string(&outcome.output_path).unwrap();
        assert!(text.contains("第一行结尾\n开头第二行，{+优化+}\n"));
    }

    #[test]
    fn test_run_replace_enforces_size_limit() {
        let (_dir, input, dict) = setup("裁员裁员裁员", "裁员,优化\n");
        let config = AppConfig {
            max_text_chars: 4,
            ..AppConfig::default()
        };
        let request = ReplaceRequest {
            input,
            dictionary: Some(dict),
            ..ReplaceRequest::default()
        };
        assert!(run_replace(&config, &request).unwrap_err().to_string().contains("文本过长"));
    }

    #[test]
    fn test_run_replace_requires_dictionary() {
        let (_dir, input, _dict) = setup("文本", "");
        let request = ReplaceRequest {
            input,
            ..ReplaceRequest::default()
        };
        assert!(run_replace(&AppConfig::default(), &request).is_err());
    }

    #[test]
    fn test_load_document_rejects_unknown_type() {
        let err = load_document(Path::new("report.docx")).err().unwrap();
        assert!(err.to_string().contains("不支持的文件类型"));
    }

    #[test]
    fn test_import_list_clear_dictionary() {
        let (dir, _input, csv) = setup("", "贿赂,礼品\n贿赂官员,商业往来\n不完整\n");
        let store = dir.path().join("store").join("words.json");

        assert_eq!(import_dictionary(&csv, &store, Some("公司词库")).unwrap(), 2);
        let pack = list_dictionary(&store).unwrap();
        assert_eq!(pack.name, "公司词库");
        assert_eq!(pack.terms[0].original, "贿赂官员");

        let dictionary = load_dictionary(&store).unwrap();
        assert_eq!(dictionary.len(), 2);

        clear_dictionary(&store).unwrap();
        assert!(list_dictionary(&store).unwrap().is_empty());
    }

    #[test]
    fn test_import_empty_csv_fails() {
        let (dir, _input, csv) = setup("", "只有一列\n");
        assert!(import_dictionary(&csv, &dir.path().join("w.json"), None).is_err());
    }
}
