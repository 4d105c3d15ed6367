use haunted_house::config::SceneConfig;

fn main() -> anyhow::Result<()> {
    haunted_house::run(SceneConfig::from_env())
}
