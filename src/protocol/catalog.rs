//! Analysis category dispatch table
//!
//! Maps an analysis tag from the descriptor to the equipment it needs and a
//! function producing its data-analysis instructions. Adding a category means
//! adding one entry to [`CATEGORIES`].

use super::ExperimentDescriptor;

/// Produces the data-analysis sub-block for one category
pub type AnalysisBlockFn = fn(&ExperimentDescriptor) -> String;

#[derive(Debug)]
pub struct AnalysisCategory {
    pub tag: &'static str,
    pub aliases: &'static [&'static str],
    pub label: &'static str,
    pub equipment: &'static [&'static str],
    pub analysis: AnalysisBlockFn,
}

pub static CATEGORIES: &[AnalysisCategory] = &[
    AnalysisCategory {
        tag: "statistical",
        aliases: &["statistics", "stats", "inferential"],
        label: "Statistical Analysis",
        equipment: &[
            "Statistical analysis software (R, Python with SciPy/statsmodels, or SPSS)",
            "Calibrated measurement instruments with documented precision for replicate readings",
            "Randomisation table or random number generator for sample allocation",
        ],
        analysis: statistical_block,
    },
    AnalysisCategory {
        tag: "descriptive",
        aliases: &["summary", "summary-statistics"],
        label: "Descriptive Analysis",
        equipment: &["Spreadsheet software for tabulating raw measurements"],
        analysis: descriptive_block,
    },
    AnalysisCategory {
        tag: "correlation",
        aliases: &["correlational"],
        label: "Correlation Analysis",
        equipment: &["Paired-measurement data sheet so both variables are recorded per sample"],
        analysis: correlation_block,
    },
    AnalysisCategory {
        tag: "regression",
        aliases: &["linear-regression", "dose-response"],
        label: "Regression Analysis",
        equipment: &[
            "Standards spanning the full range of the independent variable",
            "Software capable of linear and non-linear model fitting",
        ],
        analysis: regression_block,
    },
    AnalysisCategory {
        tag: "clustering",
        aliases: &["cluster", "cluster-analysis"],
        label: "Cluster Analysis",
        equipment: &["Software with hierarchical and k-means clustering (R, Python scikit-learn)"],
        analysis: clustering_block,
    },
    AnalysisCategory {
        tag: "pca",
        aliases: &["principal-component-analysis", "principal-components"],
        label: "Principal Component Analysis",
        equipment: &["Multivariate analysis software supporting PCA with scaling options"],
        analysis: pca_block,
    },
    AnalysisCategory {
        tag: "time-series",
        aliases: &["timeseries", "time-course", "kinetics"],
        label: "Time Series Analysis",
        equipment: &[
            "Timer or data logger with synchronised timestamps",
            "Temperature-stable environment for repeated measurements over time",
        ],
        analysis: time_series_block,
    },
    AnalysisCategory {
        tag: "anova",
        aliases: &["analysis-of-variance"],
        label: "Analysis of Variance (ANOVA)",
        equipment: &[
            "Statistical software with ANOVA and post-hoc testing (R, GraphPad Prism, SPSS)",
        ],
        analysis: anova_block,
    },
];

/// Used for absent or unrecognised analysis tags
pub static GENERIC: AnalysisCategory = AnalysisCategory {
    tag: "general",
    aliases: &[],
    label: "General Data Analysis",
    equipment: &["Spreadsheet or analysis software for recording and summarising results"],
    analysis: generic_block,
};

/// Lower-case a tag and unify `_`/space separators to `-`
pub fn normalize_tag(tag: &str) -> String {
    tag.trim()
        .to_lowercase()
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn lookup(tag: &str) -> Option<&'static AnalysisCategory> {
    let normalized = normalize_tag(tag);
    CATEGORIES
        .iter()
        .find(|c| c.tag == normalized || c.aliases.contains(&normalized.as_str()))
}

/// Categories for the descriptor's tags in declared order
///
/// Unrecognised tags map to [`GENERIC`]; duplicates are dropped. An empty tag
/// list yields just [`GENERIC`].
pub fn resolve(tags: &[String]) -> Vec<&'static AnalysisCategory> {
    let mut resolved: Vec<&'static AnalysisCategory> = Vec::new();

    for tag in tags.iter().filter(|t| !t.trim().is_empty()) {
        let category = lookup(tag).unwrap_or(&GENERIC);
        if !resolved.iter().any(|c| c.tag == category.tag) {
            resolved.push(category);
        }
    }

    if resolved.is_empty() {
        resolved.push(&GENERIC);
    }
    resolved
}

fn subject(descriptor: &ExperimentDescriptor) -> String {
    descriptor
        .purpose_text()
        .map(|p| p.trim_end_matches('.').to_string())
        .unwrap_or_else(|| format!("the effects studied in {}", descriptor.title.trim()))
}

fn statistical_block(descriptor: &ExperimentDescriptor) -> String {
    format!(
        "Descriptive statistics:\n\
         - Report mean, standard deviation and standard error for every condition.\n\
         - Plot raw data points alongside group means to reveal outliers.\n\
         Inferential statistics:\n\
         - State the null hypothesis for {} before collecting data.\n\
         - Check normality (Shapiro-Wilk) and equal variances (Levene) first.\n\
         - Use a t-test or its non-parametric equivalent (Mann-Whitney U) for two groups.\n\
         - Report exact p-values with a significance threshold of 0.05 and 95% \
         confidence intervals.",
        subject(descriptor)
    )
}

fn descriptive_block(_descriptor: &ExperimentDescriptor) -> String {
    "Descriptive summary:\n\
     - Tabulate n, mean, median, standard deviation, minimum and maximum per condition.\n\
     - Produce histograms or box plots to show the distribution of each measurement.\n\
     - Note any missing or excluded values and the reason for exclusion."
        .to_string()
}

fn correlation_block(_descriptor: &ExperimentDescriptor) -> String {
    "Correlation analysis:\n\
     - Draw a scatter plot of each variable pair before computing coefficients.\n\
     - Use Pearson's r for linear, normally distributed data; otherwise Spearman's rho.\n\
     - Report the coefficient, its 95% confidence interval and the p-value.\n\
     - Do not interpret correlation as causation without a controlled manipulation."
        .to_string()
}

fn regression_block(_descriptor: &ExperimentDescriptor) -> String {
    "Regression analysis:\n\
     - Fit a linear model of the response on the manipulated variable.\n\
     - Inspect residual plots for non-linearity and heteroscedasticity.\n\
     - Report slope, intercept, R-squared and standard errors of the coefficients.\n\
     - Consider a non-linear (e.g. four-parameter logistic) fit for dose-response data."
        .to_string()
}

fn clustering_block(_descriptor: &ExperimentDescriptor) -> String {
    "Cluster analysis:\n\
     - Standardise variables (z-scores) so no single measurement dominates distances.\n\
     - Run hierarchical clustering with Ward linkage and inspect the dendrogram.\n\
     - Choose k for k-means using the elbow method or silhouette scores.\n\
     - Check cluster stability by re-running on bootstrap resamples."
        .to_string()
}

fn pca_block(_descriptor: &ExperimentDescriptor) -> String {
    "Principal component analysis:\n\
     - Centre and scale all variables before decomposition.\n\
     - Report the variance explained by each component and show a scree plot.\n\
     - Plot samples on the first two components, coloured by experimental condition.\n\
     - Examine loadings to identify which measurements drive separation."
        .to_string()
}

fn time_series_block(_descriptor: &ExperimentDescriptor) -> String {
    "Time series analysis:\n\
     - Record measurements at fixed intervals with synchronised timestamps.\n\
     - Plot each replicate over time before averaging.\n\
     - Fit growth or decay models (exponential, logistic) where appropriate.\n\
     - Compare rates between conditions using the fitted model parameters."
        .to_string()
}

fn anova_block(_descriptor: &ExperimentDescriptor) -> String {
    "Analysis of variance:\n\
     - Use one-way ANOVA for a single factor with three or more levels; two-way ANOVA \
     for factorial designs.\n\
     - Verify normality of residuals and homogeneity of variances beforehand.\n\
     - Follow significant results with Tukey's HSD post-hoc comparisons.\n\
     - Report F statistics, degrees of freedom, p-values and effect sizes (eta-squared)."
        .to_string()
}

fn generic_block(descriptor: &ExperimentDescriptor) -> String {
    format!(
        "General analysis:\n\
         - Organise raw measurements in a table with one row per sample.\n\
         - Summarise each condition with mean and standard deviation.\n\
         - Visualise results with appropriate charts and compare against controls.\n\
         - Choose statistical tests suited to the data type and to {}.",
        subject(descriptor)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("Time_Series"), "time-series");
        assert_eq!(normalize_tag("  time series "), "time-series");
        assert_eq!(normalize_tag("PCA"), "pca");
    }

    #[test]
    fn test_lookup_by_tag_and_alias() {
        assert_eq!(lookup("ANOVA").map(|c| c.tag), Some("anova"));
        assert_eq!(lookup("timeseries").map(|c| c.tag), Some("time-series"));
        assert_eq!(lookup("statistics").map(|c| c.tag), Some("statistical"));
        assert!(lookup("astrology").is_none());
    }

    #[test]
    fn test_resolve_keeps_declared_order_and_dedups() {
        let tags = vec![
            "regression".to_string(),
            "statistical".to_string(),
            "Regression".to_string(),
        ];
        let tags: Vec<&str> = resolve(&tags).iter().map(|c| c.tag).collect();
        assert_eq!(tags, vec!["regression", "statistical"]);
    }

    #[test]
    fn test_resolve_falls_back_to_generic() {
        assert_eq!(resolve(&[])[0].tag, "general");

        let tags = vec!["mystery".to_string(), "unknown".to_string(), "pca".to_string()];
        let resolved: Vec<&str> = resolve(&tags).iter().map(|c| c.tag).collect();
        assert_eq!(resolved, vec!["general", "pca"]);
    }

    #[test]
    fn test_every_category_has_content() {
        let descriptor = ExperimentDescriptor::new("Trial");
        for category in CATEGORIES.iter().chain(std::iter::once(&GENERIC)) {
            assert!(!category.equipment.is_empty(), "{}", category.tag);
            assert!(!(category.analysis)(&descriptor).is_empty(), "{}", category.tag);
        }
    }
}
