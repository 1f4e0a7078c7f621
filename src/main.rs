//! Демонстрационный бинарник: собирает энкодер по аргументам командной
//! строки и печатает его послойное описание.

use clap::Parser;
use convae::models::Autoencoder;

/// Аргументы командной строки
#[derive(Parser, Debug)]
#[command(author, version, about = "ConvAE: построитель энкодера свёрточного автоэнкодера", long_about = None)]
struct Args {
    /// Высота входного изображения
    #[arg(long, default_value_t = 28)]
    height: usize,

    /// Ширина входного изображения
    #[arg(long, default_value_t = 28)]
    width: usize,

    /// Количество каналов входного изображения
    #[arg(long, default_value_t = 1)]
    channels: usize,

    /// Количество фильтров каждого свёрточного блока (через запятую)
    #[arg(long, value_delimiter = ',', default_values_t = vec![32, 64, 64, 64])]
    filters: Vec<usize>,

    /// Размер ядра каждого свёрточного блока (через запятую)
    #[arg(long, value_delimiter = ',', default_values_t = vec![3, 3, 3, 3])]
    kernels: Vec<usize>,

    /// Шаг каждого свёрточного блока (через запятую)
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2, 2, 1])]
    strides: Vec<usize>,

    /// Размерность латентного пространства
    #[arg(long, default_value_t = 2)]
    latent: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let autoencoder = Autoencoder::new(
        (args.height, args.width, args.channels),
        args.filters,
        args.kernels,
        args.strides,
        args.latent,
    )?;

    autoencoder.summary();
    println!(
        "Форма карты признаков перед бутылочным горлышком: {:?}",
        autoencoder.shape_before_bottleneck()
    );

    let buffers = autoencoder.encoder().init_parameters();
    println!(
        "Инициализировано буферов параметров: {} (всего {} скалярных весов)",
        buffers.len(),
        autoencoder.encoder().num_parameters()
    );

    Ok(())
}
