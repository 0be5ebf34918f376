use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which side of the comparison a dataset plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetRole {
    Master,
    Candidate,
}

impl DatasetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Candidate => "candidate",
        }
    }
}

impl std::fmt::Display for DatasetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One specification row. Values are aligned with the owning dataset's columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub values: Vec<Option<String>>,
}

impl Record {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at a column position; out-of-range and absent cells both read as `None`.
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).and_then(|v| v.as_deref())
    }

    pub fn is_blank(&self) -> bool {
        self.values.iter().all(|v| v.is_none())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Human-readable origin (usually the file name), used in logs and the summary.
    pub label: String,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            label: label.into(),
            columns,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Field access by column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.records.get(row)?.value(idx)
    }

    /// Appends a record, padding or truncating it to the column count.
    pub fn push(&mut self, mut record: Record) {
        record.values.resize(self.columns.len(), None);
        self.records.push(record);
    }

    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(|c| c.as_str()).collect()
    }
}

/// Attributes that take part in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Region,
    Country,
    Brand,
    Model,
    Cpu,
    Gpu,
    Resolution,
}

impl Attribute {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Region => "region",
            Self::Country => "country",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Resolution => "resolution",
        }
    }
}

// Column mapping per dataset role; the quarterly master files name the country
// column differently from the scraped candidate files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMapping {
    pub region: String,
    pub country: String,
    pub brand: String,
    pub model: String,
    pub cpu: String,
    pub gpu: String,
    pub resolution: String,
}

impl SchemaMapping {
    pub fn for_role(role: DatasetRole) -> Self {
        let country = match role {
            DatasetRole::Master => "Country/territory",
            DatasetRole::Candidate => "Country",
        };
        Self {
            region: "Region".into(),
            country: country.into(),
            brand: "Brand".into(),
            model: "Model Name".into(),
            cpu: "CPU Model".into(),
            gpu: "GPU Model".into(),
            resolution: "Resolution".into(),
        }
    }

    pub fn columns(&self) -> [(Attribute, &str); 7] {
        [
            (Attribute::Region, self.region.as_str()),
            (Attribute::Country, self.country.as_str()),
            (Attribute::Brand, self.brand.as_str()),
            (Attribute::Model, self.model.as_str()),
            (Attribute::Cpu, self.cpu.as_str()),
            (Attribute::Gpu, self.gpu.as_str()),
            (Attribute::Resolution, self.resolution.as_str()),
        ]
    }

    pub fn resolve(&self, dataset: &Dataset) -> ResolvedSchema {
        ResolvedSchema {
            region: dataset.column_index(&self.region),
            country: dataset.column_index(&self.country),
            brand: dataset.column_index(&self.brand),
            model: dataset.column_index(&self.model),
            cpu: dataset.column_index(&self.cpu),
            gpu: dataset.column_index(&self.gpu),
            resolution: dataset.column_index(&self.resolution),
        }
    }

    /// Mapped columns that the dataset does not have.
    pub fn missing_columns<'a>(&'a self, dataset: &Dataset) -> Vec<(Attribute, &'a str)> {
        self.columns()
            .into_iter()
            .filter(|(_, col)| dataset.column_index(col).is_none())
            .collect()
    }
}

/// Column positions of the matching attributes within one dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub region: Option<usize>,
    pub country: Option<usize>,
    pub brand: Option<usize>,
    pub model: Option<usize>,
    pub cpu: Option<usize>,
    pub gpu: Option<usize>,
    pub resolution: Option<usize>,
}

impl ResolvedSchema {
    pub fn read<'r>(&self, record: &'r Record, attr: Attribute) -> Option<&'r str> {
        let idx = match attr {
            Attribute::Region => self.region,
            Attribute::Country => self.country,
            Attribute::Brand => self.brand,
            Attribute::Model => self.model,
            Attribute::Cpu => self.cpu,
            Attribute::Gpu => self.gpu,
            Attribute::Resolution => self.resolution,
        }?;
        record.value(idx)
    }
}

/// Canonical comparison keys derived from one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedRecord {
    pub region_key: String,
    pub country_key: String,
    pub brand_key: String,
    pub model_key: String,
    pub cpu_key: String,
    pub gpu_key: String,
    pub resolution_key: String,
}

impl NormalizedRecord {
    pub fn same_group(&self, other: &NormalizedRecord) -> bool {
        self.region_key == other.region_key
            && self.country_key == other.country_key
            && self.brand_key == other.brand_key
    }

    pub fn same_model(&self, other: &NormalizedRecord) -> bool {
        self.model_key == other.model_key
    }

    pub fn same_specs(&self, other: &NormalizedRecord) -> bool {
        self.cpu_key == other.cpu_key
            && self.gpu_key == other.gpu_key
            && self.resolution_key == other.resolution_key
    }

    /// True when any of CPU, GPU or resolution normalized to empty.
    pub fn has_blank_spec(&self) -> bool {
        self.cpu_key.is_empty() || self.gpu_key.is_empty() || self.resolution_key.is_empty()
    }
}
