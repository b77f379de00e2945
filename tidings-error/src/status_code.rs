use std::fmt;

/// Коды статуса для категоризации ошибок и предупреждений брокера.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки и ошибки аргументов
/// - 2xxx: Ошибки данных (подписки, очереди)
/// - 4xxx: Ограничения по нагрузке
/// - 6xxx: Среда исполнения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Internal = 1003,
    InvalidArgs = 1004,
    InvalidAgent = 1006,
    InvalidPattern = 1007,
    HandlerFailed = 1008,

    // === 2xxx: Ошибки данных ===
    NotFound = 2000,
    QueueFull = 2010,
    QueueEmpty = 2011,
    Overwritten = 2012,

    // === 4xxx: Ограничение нагрузки ===
    Saturated = 4004,

    // === 6xxx: Среда исполнения ===
    NoRuntime = 6008,
}

/// Уровень, на котором диагностика с данным кодом попадает в лог.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Рекомендуемый уровень логирования для данного кода.
    ///
    /// Потери при доставке и промахи отписки идут на `warn`, сбои
    /// обработчиков и среды исполнения на `error`.
    pub fn log_level(&self) -> LogLevel {
        match self {
            Self::Success => LogLevel::Trace,
            Self::QueueEmpty => LogLevel::Debug,
            Self::InvalidArgs
            | Self::InvalidAgent
            | Self::InvalidPattern
            | Self::NotFound
            | Self::QueueFull
            | Self::Overwritten
            | Self::Saturated => LogLevel::Warn,
            Self::HandlerFailed | Self::NoRuntime | Self::Internal | Self::Unknown => {
                LogLevel::Error
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
