/// Трейт для корня агрегата
///
/// Определяет обязательные методы и статические метаданные для всех
/// агрегатов системы.
pub trait AggregateRoot {
    /// Тип идентификатора агрегата
    type Id;

    /// Получить ID записи
    fn id(&self) -> Self::Id;

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции документов в хранилище (например, "projects")
    fn collection_name() -> &'static str;

    /// Имя элемента для сообщений (единственное число)
    fn element_name() -> &'static str;

    /// Полное имя агрегата для системы (например, "a001_projects")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
