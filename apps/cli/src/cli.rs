//! # Argument Definitions
//!
//! clap derive structs for every `shoebox` subcommand. Conversion into core
//! request types (`ItemDraft`, `ItemPatch`, `SearchQuery`) lives here too so
//! `commands` only deals with typed requests.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use shoebox_core::query::MAX_LIMIT;
use shoebox_core::{ItemDraft, ItemPatch, Money, SearchQuery, SortField, SortOrder};

#[derive(Debug, Parser)]
#[command(name = "shoebox")]
#[command(about = "신발 재고 관리 CLI")]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir `shoebox.toml`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overrides the configured path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 데이터베이스 초기화 (migrations)
    InitDb {
        /// Also write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },

    /// 새 재고 항목 추가
    Add(AddArgs),

    /// 바코드 정보 조회
    GetBarcode { barcode: String },

    /// 바코드로 재고 및 자동완성 정보 조회
    Lookup { barcode: String },

    /// 재고 목록 조회
    List(ListArgs),

    /// 재고 항목 상세 조회
    Show { id: String },

    /// 재고 항목 수정
    Update(UpdateArgs),

    /// 재고 항목 삭제
    Delete {
        id: String,

        /// 확인 없이 삭제
        #[arg(short, long)]
        force: bool,
    },

    /// 여러 항목 일괄 삭제
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<String>,

        /// 확인 없이 삭제
        #[arg(short, long)]
        force: bool,
    },

    /// 판매 처리 (ID 또는 --barcode)
    Sell {
        #[arg(required_unless_present = "barcode", conflicts_with = "barcode")]
        id: Option<String>,

        /// Sell the newest unsold unit with this barcode
        #[arg(short, long)]
        barcode: Option<String>,

        /// 판매일 (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// CSV 파일 가져오기
    ImportCsv {
        file: PathBuf,

        /// First row is data, columns in canonical order
        #[arg(long)]
        no_header: bool,

        /// Encoding tried first (default from config)
        #[arg(long)]
        encoding: Option<String>,
    },

    /// CSV 내보내기
    ExportCsv {
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        no_headers: bool,
    },

    /// HTML 보고서 내보내기
    ExportHtml {
        file: PathBuf,

        /// 보고서 제목
        #[arg(long)]
        title: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// 재고 통계
    Stats,

    /// 통계 보고서 내보내기 (HTML)
    ExportStats { file: PathBuf },
}

// =============================================================================
// Item Fields
// =============================================================================

#[derive(Debug, Clone, Default, Args)]
pub struct AddArgs {
    /// 보관 위치
    #[arg(short, long)]
    pub location: Option<String>,

    /// 구매일 (YYYY-MM-DD)
    #[arg(short, long)]
    pub purchase_date: Option<NaiveDate>,

    /// 모델명
    #[arg(short, long)]
    pub model_name: Option<String>,

    /// 제품명
    #[arg(short, long)]
    pub name: Option<String>,

    /// 구매처
    #[arg(short, long)]
    pub vendor: Option<String>,

    /// 가격 ("149000", "₩149,000")
    #[arg(long, value_parser = parse_price)]
    pub price: Option<Decimal>,

    /// 사이즈
    #[arg(short, long)]
    pub size: Option<String>,

    /// 바코드
    #[arg(short, long)]
    pub barcode: Option<String>,

    /// 판매일 (YYYY-MM-DD)
    #[arg(long)]
    pub sale_date: Option<NaiveDate>,

    /// 메모
    #[arg(long)]
    pub notes: Option<String>,

    /// Do not fill blank fields from the last item with the same barcode
    #[arg(long)]
    pub no_autofill: bool,
}

impl AddArgs {
    pub fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            location: self.location.clone(),
            purchase_date: self.purchase_date,
            sale_date: self.sale_date,
            model_name: self.model_name.clone(),
            name: self.name.clone(),
            size: self.size.clone(),
            vendor: self.vendor.clone(),
            price: self.price,
            notes: self.notes.clone(),
            barcode: self.barcode.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub purchase_date: Option<NaiveDate>,

    #[arg(short, long)]
    pub model_name: Option<String>,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub vendor: Option<String>,

    #[arg(long, value_parser = parse_price)]
    pub price: Option<Decimal>,

    /// Empty string clears the size
    #[arg(short, long)]
    pub size: Option<String>,

    /// Empty string clears the barcode
    #[arg(short, long)]
    pub barcode: Option<String>,

    #[arg(long, conflicts_with = "clear_sale_date")]
    pub sale_date: Option<NaiveDate>,

    /// Put a sold item back in stock
    #[arg(long)]
    pub clear_sale_date: bool,

    /// Empty string clears the notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> ItemPatch {
        ItemPatch {
            location: self.location.clone(),
            purchase_date: self.purchase_date,
            sale_date: self.sale_date,
            clear_sale_date: self.clear_sale_date,
            model_name: self.model_name.clone(),
            name: self.name.clone(),
            size: self.size.clone(),
            vendor: self.vendor.clone(),
            price: self.price,
            notes: self.notes.clone(),
            barcode: self.barcode.clone(),
        }
    }
}

// =============================================================================
// Search
// =============================================================================

/// Filters shared by `list` and the export commands.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// 검색 키워드 (이름, 모델명, 구매처, 메모, 바코드)
    #[arg(short, long)]
    pub keyword: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    #[arg(short, long)]
    pub model_name: Option<String>,

    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub vendor: Option<String>,

    #[arg(short, long)]
    pub size: Option<String>,

    #[arg(short, long)]
    pub barcode: Option<String>,

    #[arg(long)]
    pub purchase_date_from: Option<NaiveDate>,

    #[arg(long)]
    pub purchase_date_to: Option<NaiveDate>,

    #[arg(long)]
    pub sale_date_from: Option<NaiveDate>,

    #[arg(long)]
    pub sale_date_to: Option<NaiveDate>,

    #[arg(long, value_parser = Money::parse)]
    pub price_min: Option<Money>,

    #[arg(long, value_parser = Money::parse)]
    pub price_max: Option<Money>,
}

impl FilterArgs {
    pub fn is_empty(&self) -> bool {
        self.to_query(SearchQuery::new()) == SearchQuery::new()
    }

    /// Copies the filters onto `base`, keeping its sort and page.
    pub fn to_query(&self, base: SearchQuery) -> SearchQuery {
        SearchQuery {
            keyword: self.keyword.clone(),
            location: self.location.clone(),
            model_name: self.model_name.clone(),
            name: self.name.clone(),
            vendor: self.vendor.clone(),
            size: self.size.clone(),
            barcode: self.barcode.clone(),
            purchase_date_from: self.purchase_date_from,
            purchase_date_to: self.purchase_date_to,
            sale_date_from: self.sale_date_from,
            sale_date_to: self.sale_date_to,
            price_min: self.price_min,
            price_max: self.price_max,
            ..base
        }
    }

    /// Query for the export commands: `None` exports everything.
    pub fn export_query(&self) -> Option<SearchQuery> {
        (!self.is_empty()).then(|| self.to_query(SearchQuery::all()))
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// 정렬 기준 (purchase_date, sale_date, price, created_at, ...)
    #[arg(long, default_value = "created_at")]
    pub sort_by: SortField,

    /// 오름차순 정렬 (default: descending)
    #[arg(long)]
    pub asc: bool,

    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

impl ListArgs {
    pub fn to_query(&self) -> SearchQuery {
        let order = if self.asc { SortOrder::Asc } else { SortOrder::Desc };
        self.filters.to_query(
            SearchQuery::new()
                .sort(self.sort_by, order)
                .page(self.limit.min(MAX_LIMIT), self.offset),
        )
    }
}

/// Accepts the same price text as CSV import.
fn parse_price(text: &str) -> Result<Decimal, String> {
    Money::parse(text)
        .map(|money| money.to_decimal())
        .map_err(|e| e.to_string())
}
