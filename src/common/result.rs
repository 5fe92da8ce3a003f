use crate::common::error::TidyError;

/// tidysync全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use tidysync::common::result::TidyResult;
/// use tidysync::common::error::TidyError;
///
/// fn example_function() -> TidyResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> TidyResult<()> {
///     Err(TidyError::internal_error("Something went wrong"))
/// }
/// ```
pub type TidyResult<T> = Result<T, TidyError>;

/// Optionのエラー変換ヘルパー
pub trait OptionExt<T> {
    /// OptionをTidyResultに変換する
    fn ok_or_tidy(self, error: TidyError) -> TidyResult<T>;

    /// Option値をValidationErrorに変換する
    ///
    /// # Examples
    ///
    /// ```
    /// use tidysync::common::result::{TidyResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: TidyResult<String> = none_value.ok_or_validation_error("field", "required");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> TidyResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_tidy(self, error: TidyError) -> TidyResult<T> {
        self.ok_or(error)
    }

    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> TidyResult<T> {
        self.ok_or_else(|| TidyError::validation_error(field, message, None))
    }
}

/// Resultのエラー変換ヘルパー
pub trait ResultExt<T, E> {
    /// ResultをTidyResultに変換する
    fn map_tidy_err<F>(self, f: F) -> TidyResult<T>
    where
        F: FnOnce(E) -> TidyError;

    /// ファイルシステムエラーとしてTidyResultに変換
    ///
    /// # Examples
    ///
    /// ```
    /// use tidysync::common::result::{TidyResult, ResultExt};
    /// use std::path::PathBuf;
    ///
    /// let result: Result<String, std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let tidy_result: TidyResult<String> =
    ///     result.with_filesystem_error("Failed to read", Some(PathBuf::from("a.txt")));
    /// assert!(tidy_result.is_err());
    /// ```
    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> TidyResult<T>
    where
        E: Into<std::io::Error>;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_tidy_err<F>(self, f: F) -> TidyResult<T>
    where
        F: FnOnce(E) -> TidyError,
    {
        self.map_err(f)
    }

    fn with_filesystem_error(
        self,
        message: impl Into<String>,
        path: Option<std::path::PathBuf>,
    ) -> TidyResult<T>
    where
        E: Into<std::io::Error>,
    {
        self.map_err(|e| TidyError::filesystem_error_with_source(message, path, e.into()))
    }
}
