//! Initial database migration.
//!
//! Creates users, autónomo profiles, income and expense records and
//! refresh-token sessions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(PERFILES_SQL).await?;
        db.execute_unprepared(INGRESOS_SQL).await?;
        db.execute_unprepared(GASTOS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(254) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    first_name VARCHAR(150) NOT NULL DEFAULT '',
    last_name VARCHAR(150) NOT NULL DEFAULT '',
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const PERFILES_SQL: &str = r"
CREATE TABLE perfiles_autonomos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    usuario_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    nombre_fiscal VARCHAR(200) NOT NULL,
    nif VARCHAR(9) NOT NULL,
    direccion TEXT NOT NULL,
    codigo_postal VARCHAR(5) NOT NULL,
    ciudad VARCHAR(100) NOT NULL,
    provincia VARCHAR(100) NOT NULL,
    tipo_irpf_default INTEGER NOT NULL DEFAULT 7,
    regimen_iva VARCHAR(20) NOT NULL DEFAULT 'general',
    fecha_alta DATE NOT NULL DEFAULT CURRENT_DATE,
    activo BOOLEAN NOT NULL DEFAULT true,

    CONSTRAINT perfiles_autonomos_nif_key UNIQUE (nif),
    CONSTRAINT chk_tipo_irpf_default CHECK (tipo_irpf_default BETWEEN 0 AND 20),
    CONSTRAINT chk_regimen_iva CHECK (regimen_iva IN ('general', 'simplificado', 'recargo'))
);
";

const INGRESOS_SQL: &str = r"
CREATE TABLE ingresos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    usuario_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    fecha DATE NOT NULL,
    descripcion VARCHAR(200) NOT NULL,
    cliente VARCHAR(100) NOT NULL,
    importe NUMERIC(10, 2) NOT NULL,
    iva_porcentaje INTEGER NOT NULL DEFAULT 21,
    irpf_porcentaje INTEGER NOT NULL DEFAULT 7,
    trimestre INTEGER NOT NULL,
    año INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_ingresos_importe CHECK (importe > 0),
    CONSTRAINT chk_ingresos_iva CHECK (iva_porcentaje IN (0, 21)),
    CONSTRAINT chk_ingresos_irpf CHECK (irpf_porcentaje BETWEEN 0 AND 20),
    CONSTRAINT chk_ingresos_trimestre CHECK (trimestre BETWEEN 1 AND 4)
);

CREATE INDEX idx_ingresos_usuario_fecha ON ingresos(usuario_id, fecha DESC);
CREATE INDEX idx_ingresos_usuario_periodo ON ingresos(usuario_id, trimestre, año);
";

const GASTOS_SQL: &str = r"
CREATE TABLE gastos (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    usuario_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    fecha DATE NOT NULL,
    descripcion VARCHAR(200) NOT NULL,
    proveedor VARCHAR(100) NOT NULL,
    importe NUMERIC(10, 2) NOT NULL,
    iva_porcentaje INTEGER NOT NULL DEFAULT 21,
    factura VARCHAR(255),
    trimestre INTEGER NOT NULL,
    año INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_gastos_importe CHECK (importe > 0),
    CONSTRAINT chk_gastos_iva CHECK (iva_porcentaje IN (0, 21)),
    CONSTRAINT chk_gastos_trimestre CHECK (trimestre BETWEEN 1 AND 4)
);

CREATE INDEX idx_gastos_usuario_fecha ON gastos(usuario_id, fecha DESC);
CREATE INDEX idx_gastos_usuario_periodo ON gastos(usuario_id, trimestre, año);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    refresh_token_hash VARCHAR(64) NOT NULL,
    user_agent TEXT,
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_expires_future CHECK (expires_at > created_at)
);

CREATE UNIQUE INDEX idx_sessions_token ON sessions(refresh_token_hash);
CREATE INDEX idx_sessions_user_active ON sessions(user_id) WHERE revoked_at IS NULL;
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION update_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION update_updated_at();

CREATE TRIGGER trg_ingresos_updated_at
    BEFORE UPDATE ON ingresos
    FOR EACH ROW EXECUTE FUNCTION update_updated_at();

CREATE TRIGGER trg_gastos_updated_at
    BEFORE UPDATE ON gastos
    FOR EACH ROW EXECUTE FUNCTION update_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS sessions CASCADE;
DROP TABLE IF EXISTS gastos CASCADE;
DROP TABLE IF EXISTS ingresos CASCADE;
DROP TABLE IF EXISTS perfiles_autonomos CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS update_updated_at() CASCADE;
";
